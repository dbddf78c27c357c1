//! Built-in plot twists used when plot option generation fails.

const GENERAL: &[&str] = &[
    "The protagonist discovers they've been misled the entire time",
    "A trusted ally is revealed to be working against the protagonist",
    "The antagonist is revealed to be a family member",
    "A seemingly unimportant character is revealed as the mastermind",
    "Two timelines are revealed to be occurring simultaneously",
    "The entire story is revealed to be a dream/hallucination",
    "The protagonist and antagonist must work together to overcome a greater threat",
    "A character believed dead returns at a crucial moment",
    "A prophecy/prediction is fulfilled but in an unexpected way",
    "A character's true identity is revealed, changing the story's context",
];

const GHOST: &[&str] = &[
    "The ghost is actually protecting the protagonist from a greater evil",
    "The protagonist discovers they've been dead the whole time",
    "The haunting is revealed to be a hoax by a living person with ulterior motives",
    "The ghost is actually from the future, not the past",
    "Multiple spirits are revealed to be different aspects of the same person",
    "The supposed ghost is actually a living person trapped between dimensions",
    "The protagonist discovers they can see ghosts due to a near-death experience in their forgotten past",
    "The ghost is revealed to be a manifestation of the protagonist's guilt or trauma",
    "The haunting is revealed to be caused by an object, not a location",
    "The ghost is revealed to be the protagonist from another timeline",
];

const SCI_FI: &[&str] = &[
    "Technology intended to help humanity is revealed to have a sinister purpose",
    "The alien species is revealed to be evolved humans from the future",
    "The protagonist discovers they are a clone/android/synthetic human",
    "The apparently distant planet is revealed to be future Earth",
    "The antagonist is revealed to be the protagonist from an alternate timeline",
    "The technology is revealed to be powered by human consciousness/souls",
    "The mission is revealed to be a simulation/experiment",
    "The seemingly benevolent AI is revealed to have its own agenda",
    "The disease/phenomenon is revealed to be caused by time travel",
    "The corporation is revealed to be controlled by a non-human intelligence",
];

/// Stock plot twists for a story type.
///
/// Knows `general`, `ghost` and `sci-fi` (also `scifi`, `sci fi`); anything
/// else gets the general list.
pub fn plot_twists(story_type: &str) -> &'static [&'static str] {
    match story_type.trim().to_lowercase().replace([' ', '_'], "-").as_str() {
        "ghost" => GHOST,
        "sci-fi" | "scifi" => SCI_FI,
        _ => GENERAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types() {
        assert_eq!(plot_twists("Ghost").len(), 10);
        assert!(plot_twists("sci fi")[1].contains("alien"));
        assert!(plot_twists("SciFi")[3].contains("future Earth"));
    }

    #[test]
    fn test_unknown_type_falls_back_to_general() {
        assert_eq!(plot_twists("romance"), plot_twists("general"));
    }
}
