//! List the cards a character owns, minus temporary editing copies.

use talent_tree_domain::Card;

use crate::use_cases::error::ProgressionError;
use crate::use_cases::services::{RequestContext, TreeServices};

pub struct ListOwnedCards {
    services: TreeServices,
}

impl ListOwnedCards {
    pub fn new(services: TreeServices) -> Self {
        Self { services }
    }

    pub async fn execute(&self, ctx: &RequestContext) -> Result<Vec<Card>, ProgressionError> {
        self.services.require_owner(ctx)?;
        Ok(self.services.cards.owned_cards(ctx.character_id).await?)
    }
}
