//! Card use cases.
//!
//! Binding nodes to card documents: associating existing cards, staging
//! payloads for later, editing staged cards before unlock and editing bound
//! cards in place.

use std::sync::Arc;

use crate::use_cases::services::TreeServices;

mod associate;
mod edit;
mod editing;
mod owned;
mod stage;

pub use associate::AssociateCard;
pub use edit::EditBoundCard;
pub use editing::StageForEditing;
pub use owned::ListOwnedCards;
pub use stage::{StageCard, StageOutcome};

/// Container for card use cases.
pub struct CardUseCases {
    pub associate: Arc<AssociateCard>,
    pub edit: Arc<EditBoundCard>,
    pub stage: Arc<StageCard>,
    pub stage_for_editing: Arc<StageForEditing>,
    pub owned: Arc<ListOwnedCards>,
}

impl CardUseCases {
    pub fn new(services: TreeServices) -> Self {
        Self {
            associate: Arc::new(AssociateCard::new(services.clone())),
            edit: Arc::new(EditBoundCard::new(services.clone())),
            stage: Arc::new(StageCard::new(services.clone())),
            stage_for_editing: Arc::new(StageForEditing::new(services.clone())),
            owned: Arc::new(ListOwnedCards::new(services)),
        }
    }
}
