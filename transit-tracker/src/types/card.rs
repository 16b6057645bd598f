/// Demo user owning the mock transit card.
pub const DEMO_USER_ID: &str = "user1";

/// A rechargeable transit card with its balance in MAD.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitCard {
    pub card_number: String,
    pub balance: u32,
    pub user_id: String,
}

impl TransitCard {
    pub fn new(card_number: &str, balance: u32, user_id: &str) -> Self {
        TransitCard {
            card_number: card_number.to_string(),
            balance,
            user_id: user_id.to_string(),
        }
    }

    /// The card returned by the mock card service for any user.
    pub fn demo(user_id: &str) -> Self {
        TransitCard::new("ALSA-358914", 75, user_id)
    }

    /// Whether the balance covers a single trip at `fare`.
    pub fn covers(&self, fare: u32) -> bool {
        self.balance >= fare
    }
}
