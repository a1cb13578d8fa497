use rand::seq::SliceRandom;
use rand::Rng;

pub const SPACE_FACTS: [&str; 7] = [
    "A day on Venus is longer than a year on Venus.",
    "Neutron stars can spin up to 716 times per second.",
    "There are more trees on Earth than stars in the Milky Way.",
    "A spoonful of neutron star would weigh about a billion tons.",
    "Space is not completely empty; it contains a few atoms per cubic meter.",
    "The footprints on the Moon will likely remain for millions of years.",
    "Jupiter's Great Red Spot is a storm larger than Earth and has lasted for centuries.",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactBox {
    pub heading: &'static str,
    pub fact: &'static str,
}

impl FactBox {
    pub fn new(fact: &'static str) -> Self {
        Self {
            heading: "Did you know?",
            fact,
        }
    }
}

pub fn pick_fact<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    SPACE_FACTS.choose(rng).copied().unwrap_or(SPACE_FACTS[0])
}

pub fn inject<R: Rng + ?Sized>(slot: &mut Option<FactBox>, rng: &mut R) -> bool {
    if slot.is_some() {
        return false;
    }
    let fact = pick_fact(rng);
    tracing::debug!(fact, "showing space fact");
    *slot = Some(FactBox::new(fact));
    true
}
