use rand::seq::SliceRandom;
use rand::Rng;

pub const THANKS_PHRASES: [&str; 4] = [
    "Thank you!",
    "Thanks a lot!",
    "I appreciate it!",
    "Many thanks!",
];

pub const INITIAL_MESSAGE_PHRASES: [&str; 3] = [
    "Hello! How can I assist you today?",
    "Hi! How can I help?",
    "Hey! What's on your mind?",
];

/// Random thanks phrase woven into a reply.
pub fn thanks_phrase<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    THANKS_PHRASES
        .choose(rng)
        .copied()
        .unwrap_or(THANKS_PHRASES[0])
}

/// Random opening line for a fresh session.
pub fn initial_message<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    INITIAL_MESSAGE_PHRASES
        .choose(rng)
        .copied()
        .unwrap_or(INITIAL_MESSAGE_PHRASES[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn pickers_stay_within_their_sets() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(THANKS_PHRASES.contains(&thanks_phrase(&mut rng)));
            assert!(INITIAL_MESSAGE_PHRASES.contains(&initial_message(&mut rng)));
        }
    }

    #[test]
    fn pickers_are_deterministic_for_a_fixed_seed() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            assert_eq!(thanks_phrase(&mut a), thanks_phrase(&mut b));
        }
    }
}
