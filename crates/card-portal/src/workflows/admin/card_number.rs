use rand::Rng;

use crate::workflows::application::CardType;

const SERIAL_MIN: u32 = 100_000_000;
const SERIAL_MAX: u32 = 999_999_999;

/// Proposes card numbers for the card-creation form.
///
/// Numbers are a prefix plus a random nine-digit serial. Nothing here checks
/// for collisions; the registry rejects duplicates on create.
#[derive(Debug, Clone, Copy, Default)]
pub struct CardNumberSuggester;

impl CardNumberSuggester {
    pub const fn prefix(card_type: CardType) -> &'static str {
        match card_type {
            CardType::Disability => "DC",
            CardType::Carers => "CC",
            CardType::CustomerSupport => "CS",
        }
    }

    pub fn suggest(&self, card_type: CardType) -> String {
        self.suggest_with(card_type, &mut rand::thread_rng())
    }

    pub fn suggest_with<R: Rng + ?Sized>(&self, card_type: CardType, rng: &mut R) -> String {
        let serial = rng.gen_range(SERIAL_MIN..=SERIAL_MAX);
        format!("{}{serial}", Self::prefix(card_type))
    }
}
