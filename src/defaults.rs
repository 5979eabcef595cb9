//! Built-in note sets.
//!
//! The tutorial set is what `restore_defaults` puts back under the reserved
//! tag. A first run additionally gets the food set so the app is not empty.

use chrono::{DateTime, TimeDelta, Utc};
use rand::{seq::SliceRandom, Rng};

use crate::{normalize_tag, Note, NoteVersion};

/// Tag marking notes that `restore_defaults` may replace.
pub const DEFAULT_RESERVED_TAG: &str = "tutorial";

const TUTORIAL_HISTORY_LEN: usize = 10;

struct TutorialSeed {
    title: &'static str,
    content: &'static str,
    history_title: &'static str,
    history_content: &'static str,
}

const TUTORIAL_SEEDS: [TutorialSeed; 3] = [
    TutorialSeed {
        title: "👋 Welcome to Halp Notes",
        content: "Welcome! This is a simple note-taking app that helps you organize your thoughts. These tutorial notes will help you get started - you can delete them anytime.",
        history_title: "👋 Welcome to Notes",
        history_content: "Welcome to our note-taking app! This simple tool will help you organize your thoughts.",
    },
    TutorialSeed {
        title: "✍️ Creating & Organizing",
        content: "Create a new note and add tags to organize it. Use the tag filter to find related notes quickly. You can edit notes at any time, and every edit keeps the previous version.",
        history_title: "✍️ Creating Notes",
        history_content: "Learn how to create and organize your notes effectively with our simple tools.",
    },
    TutorialSeed {
        title: "🎨 Customize & Search",
        content: "Search finds notes by title or content, including older versions of a note. Try searching for \"tutorial\" to find these notes again!",
        history_title: "🎨 Customization Guide",
        history_content: "Discover how to personalize your note-taking experience with themes and search features.",
    },
];

const FOOD_QUALITIES: [&str; 5] = ["healthy", "comfort", "quick", "reward", "favorite"];

const MEALS: [(&str, [&str; 10]); 4] = [
    (
        "breakfast",
        [
            "Overnight oats with berries and honey",
            "Avocado toast with poached eggs",
            "Greek yogurt parfait with granola",
            "Breakfast burrito with eggs and veggies",
            "Smoothie bowl with fresh fruits",
            "Pancakes with maple syrup",
            "English breakfast with beans and toast",
            "Chia seed pudding with almonds",
            "French toast with cinnamon",
            "Breakfast sandwich with bacon",
        ],
    ),
    (
        "lunch",
        [
            "Quinoa bowl with roasted vegetables",
            "Turkey and avocado wrap",
            "Mediterranean salad with feta",
            "Poke bowl with fresh fish",
            "Vegetable soup with crusty bread",
            "Chicken Caesar salad",
            "Bento box with rice and fish",
            "Caprese sandwich with pesto",
            "Buddha bowl with tahini dressing",
            "Tuna salad with crackers",
        ],
    ),
    (
        "dinner",
        [
            "Grilled salmon with asparagus",
            "Pasta carbonara with parmesan",
            "Stir-fried tofu with vegetables",
            "Homemade pizza with fresh basil",
            "Curry chicken with rice",
            "Beef stir-fry with broccoli",
            "Vegetarian lasagna",
            "Shrimp scampi with linguine",
            "Roasted chicken with potatoes",
            "Black bean burgers with sweet potato fries",
        ],
    ),
    (
        "snack",
        [
            "Apple slices with peanut butter",
            "Trail mix with dried fruits",
            "Hummus with carrot sticks",
            "Greek yogurt with honey",
            "Popcorn with sea salt",
            "Dark chocolate squares",
            "Mixed nuts and seeds",
            "Cheese and crackers",
            "Fruit smoothie",
            "Rice cakes with avocado",
        ],
    ),
];

/// The canonical tutorial notes, all tagged `reserved_tag`.
///
/// The n-th tutorial is dated n days before `now`; each carries ten prior
/// versions spaced one day apart, oldest first.
pub fn tutorial_notes(reserved_tag: &str, now: DateTime<Utc>) -> Vec<Note> {
    let reserved_tag = normalize_tag(reserved_tag);
    TUTORIAL_SEEDS
        .iter()
        .enumerate()
        .map(|(offset, seed)| {
            let updated_at = now - TimeDelta::days(offset as i64);
            let versions: Vec<NoteVersion> = (0..TUTORIAL_HISTORY_LEN)
                .map(|i| NoteVersion {
                    title: format!("{} (Version {})", seed.history_title, i + 1),
                    content: format!("{} - Revision {}", seed.history_content, i + 1),
                    tags: vec![reserved_tag.clone()],
                    updated_at: updated_at - TimeDelta::days((TUTORIAL_HISTORY_LEN - i) as i64),
                })
                .collect();

            let mut note = Note::new_at(
                seed.title.to_string(),
                seed.content.to_string(),
                vec![reserved_tag.clone()],
                updated_at,
            );
            note.created_at = updated_at - TimeDelta::days(TUTORIAL_HISTORY_LEN as i64 + 1);
            note.versions = versions;
            note
        })
        .collect()
}

/// Sample meal notes, each tagged with its meal and two or three qualities.
pub fn food_notes<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Vec<Note> {
    MEALS
        .iter()
        .flat_map(|(meal, descriptions)| descriptions.iter().map(move |desc| (*meal, *desc)))
        .map(|(meal, desc)| {
            let picked = 2 + rng.gen_range(0..2);
            let qualities: Vec<&str> = FOOD_QUALITIES
                .choose_multiple(rng, picked)
                .copied()
                .collect();

            let mut content = format!("A delicious {meal} option that's perfect for any day. ");
            for (quality, sentence) in [
                ("healthy", "This is a nutritious choice that will keep you energized. "),
                ("quick", "Quick and easy to prepare. "),
                ("comfort", "Perfect comfort food for a cozy day. "),
                ("reward", "A great treat to reward yourself. "),
                ("favorite", "One of my all-time favorites! "),
            ] {
                if qualities.contains(&quality) {
                    content.push_str(sentence);
                }
            }

            let mut tags = vec![meal.to_string()];
            tags.extend(qualities.iter().map(|q| q.to_string()));

            let mut note = Note::new_at(desc.to_string(), content.trim_end().to_string(), tags, now);
            note.created_at = now - TimeDelta::days(rng.gen_range(0..30));
            note
        })
        .collect()
}

/// Notes seeded into an empty store on first run: tutorials, then food.
pub fn first_run_notes<R: Rng + ?Sized>(
    reserved_tag: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Note> {
    let mut notes = tutorial_notes(reserved_tag, now);
    notes.extend(food_notes(now, rng));
    notes
}
