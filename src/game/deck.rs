//! Decks and Cards
//!
//! Static deck registry. Unknown deck ids fall back to the default deck.

use serde::{Serialize, Deserialize};

/// Deck used when a deck id is unknown or missing.
pub const DEFAULT_DECK_ID: &str = "nfl-playoffs";

// =============================================================================
// CARD
// =============================================================================

/// How a card is answered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerMode {
    /// Pick one of 2-4 listed choices.
    MultipleChoice {
        /// Choices in display order
        choices: Vec<String>,
        /// Index of the correct choice
        correct_index: usize,
    },
    /// Type the answer; compared after normalization.
    FreeText {
        /// Expected answer
        answer: String,
    },
}

/// A player's answer to the current card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAnswer {
    /// Index into the card's choices.
    Choice(usize),
    /// Typed answer.
    Text(String),
}

/// One trivia card. Immutable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Stable id within its deck
    pub id: String,
    /// Question text
    pub prompt: String,
    /// Answer format and expected answer
    pub answer: AnswerMode,
}

impl Card {
    /// Build a multiple-choice card.
    pub fn multiple_choice(id: &str, prompt: &str, choices: &[&str], correct_index: usize) -> Self {
        debug_assert!((2..=4).contains(&choices.len()));
        debug_assert!(correct_index < choices.len());
        Self {
            id: id.to_string(),
            prompt: prompt.to_string(),
            answer: AnswerMode::MultipleChoice {
                choices: choices.iter().map(|c| c.to_string()).collect(),
                correct_index,
            },
        }
    }

    /// Build a free-text card.
    pub fn free_text(id: &str, prompt: &str, answer: &str) -> Self {
        Self {
            id: id.to_string(),
            prompt: prompt.to_string(),
            answer: AnswerMode::FreeText { answer: answer.to_string() },
        }
    }

    /// Choices, for multiple-choice cards.
    pub fn choices(&self) -> Option<&[String]> {
        match &self.answer {
            AnswerMode::MultipleChoice { choices, .. } => Some(choices),
            AnswerMode::FreeText { .. } => None,
        }
    }

    /// Grade an answer.
    ///
    /// Returns `None` when the answer kind does not fit the card (a typed
    /// answer to a multiple-choice card, or an out-of-range index).
    pub fn check(&self, answer: &PlayerAnswer) -> Option<bool> {
        match (&self.answer, answer) {
            (AnswerMode::MultipleChoice { choices, correct_index }, PlayerAnswer::Choice(i)) => {
                if *i < choices.len() {
                    Some(i == correct_index)
                } else {
                    None
                }
            }
            (AnswerMode::FreeText { answer }, PlayerAnswer::Text(given)) => {
                Some(normalize(given) == normalize(answer))
            }
            _ => None,
        }
    }
}

/// Trim, lowercase, and collapse whitespace runs to a single space.
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// DECK REGISTRY
// =============================================================================

/// A named, ordered collection of cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    /// Registry key
    pub id: String,
    /// Display label
    pub label: String,
    /// Cards in registry order (before the daily shuffle)
    pub cards: Vec<Card>,
}

impl Deck {
    /// Number of cards.
    #[inline]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True if the deck has no cards.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Deck ids known to the registry.
pub const DECK_IDS: &[&str] = &["nfl-playoffs", "demo"];

/// Is `deck_id` in the registry?
pub fn is_known_deck(deck_id: &str) -> bool {
    DECK_IDS.contains(&deck_id)
}

/// Look up a deck, falling back to the default deck for unknown ids.
pub fn deck_by_id(deck_id: &str) -> Deck {
    match deck_id {
        "demo" => demo_deck(),
        "nfl-playoffs" => nfl_playoffs_deck(),
        other => {
            tracing::debug!("unknown deck '{}', using {}", other, DEFAULT_DECK_ID);
            nfl_playoffs_deck()
        }
    }
}

/// Display label for a deck id.
///
/// Registry decks use their own label; anything else is title-cased from
/// its hyphenated id (`"world-cup"` -> `"World Cup"`).
pub fn deck_label(deck_id: &str) -> String {
    match deck_id {
        "nfl-playoffs" => "NFL Playoffs".to_string(),
        "demo" => "Demo".to_string(),
        other => other
            .split('-')
            .filter(|w| !w.is_empty())
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" "),
    }
}

fn demo_deck() -> Deck {
    Deck {
        id: "demo".to_string(),
        label: deck_label("demo"),
        cards: vec![
            Card::free_text("1", "What does CPU stand for?", "central processing unit"),
            Card::free_text("2", "2 + 2 =", "4"),
            Card::free_text("3", "Capital of France?", "paris"),
            Card::free_text("4", "What is the chemical symbol for water?", "h2o"),
            Card::free_text("5", "Derivative of x^2?", "2x"),
            Card::free_text("6", "Opposite of 'expand'?", "contract"),
        ],
    }
}

fn nfl_playoffs_deck() -> Deck {
    let mc = Card::multiple_choice;
    Deck {
        id: "nfl-playoffs".to_string(),
        label: deck_label("nfl-playoffs"),
        cards: vec![
            mc("nfl-01", "Who won Super Bowl LVII?",
               &["Kansas City Chiefs", "Philadelphia Eagles", "San Francisco 49ers", "Cincinnati Bengals"], 0),
            mc("nfl-02", "Which quarterback has the most Super Bowl wins?",
               &["Joe Montana", "Terry Bradshaw", "Tom Brady", "Patrick Mahomes"], 2),
            mc("nfl-03", "The \"Immaculate Reception\" was caught by a player from which team?",
               &["Oakland Raiders", "Pittsburgh Steelers", "Dallas Cowboys", "Miami Dolphins"], 1),
            mc("nfl-04", "Which team lost four straight Super Bowls in the early 1990s?",
               &["Denver Broncos", "Minnesota Vikings", "Buffalo Bills", "New England Patriots"], 2),
            mc("nfl-05", "Who was MVP of Super Bowl LVIII?",
               &["Travis Kelce", "Patrick Mahomes", "Christian McCaffrey", "Isiah Pacheco"], 1),
            mc("nfl-06", "Who made \"The Catch\" in the 1981 season NFC Championship?",
               &["Jerry Rice", "Dwight Clark", "Roger Craig", "Freddie Solomon"], 1),
            mc("nfl-07", "Which team finished the only perfect season capped by a Super Bowl win?",
               &["1972 Miami Dolphins", "2007 New England Patriots", "1985 Chicago Bears", "1989 San Francisco 49ers"], 0),
            mc("nfl-08", "How many teams make the NFL playoffs since the 2020 season?",
               &["10", "12", "14", "16"], 2),
            mc("nfl-09", "Which team won Super Bowl I?",
               &["Kansas City Chiefs", "Green Bay Packers", "New York Jets", "Baltimore Colts"], 1),
            mc("nfl-10", "Which team blew a 28-3 lead in Super Bowl LI?",
               &["Atlanta Falcons", "Carolina Panthers", "Seattle Seahawks", "Los Angeles Rams"], 0),
            mc("nfl-11", "The \"Music City Miracle\" beat which team?",
               &["Jacksonville Jaguars", "Indianapolis Colts", "Buffalo Bills", "Baltimore Ravens"], 2),
            mc("nfl-12", "Where was the \"Ice Bowl\" played?",
               &["Soldier Field", "Lambeau Field", "Arrowhead Stadium", "Metropolitan Stadium"], 1),
            mc("nfl-13", "Who is the only Super Bowl MVP from the losing team?",
               &["Chuck Howley", "Lynn Swann", "Larry Csonka", "Roger Staubach"], 0),
            mc("nfl-14", "Which team did Kansas City beat in Super Bowl LIV?",
               &["Tennessee Titans", "Green Bay Packers", "San Francisco 49ers", "Philadelphia Eagles"], 2),
            mc("nfl-15", "Which franchise has the most Super Bowl appearances?",
               &["Dallas Cowboys", "Pittsburgh Steelers", "Denver Broncos", "New England Patriots"], 3),
            mc("nfl-16", "How many teams get a first-round playoff bye since 2020?",
               &["2", "4", "6", "0"], 0),
            mc("nfl-17", "Who caught the \"Philly Special\" touchdown in Super Bowl LII?",
               &["Zach Ertz", "Trey Burton", "Nick Foles", "Alshon Jeffery"], 2),
            mc("nfl-18", "Which team ended New England's perfect-season bid in Super Bowl XLII?",
               &["New York Giants", "Philadelphia Eagles", "Arizona Cardinals", "Seattle Seahawks"], 0),
            mc("nfl-19", "Who scored on the \"Minneapolis Miracle\"?",
               &["Adam Thielen", "Stefon Diggs", "Kyle Rudolph", "Dalvin Cook"], 1),
            mc("nfl-20", "First team to win a Super Bowl in its home stadium?",
               &["Los Angeles Rams", "Tampa Bay Buccaneers", "Miami Dolphins", "Houston Texans"], 1),
            mc("nfl-21", "Whose missed field goal decided Super Bowl XXV?",
               &["Scott Norwood", "Gary Anderson", "Mike Vanderjagt", "Adam Vinatieri"], 0),
            mc("nfl-22", "Which team won Super Bowl LVI?",
               &["Cincinnati Bengals", "Los Angeles Rams", "Kansas City Chiefs", "Tampa Bay Buccaneers"], 1),
            mc("nfl-23", "Which coach won six Super Bowls with the Patriots?",
               &["Bill Parcells", "Andy Reid", "Bill Belichick", "Pete Carroll"], 2),
            mc("nfl-24", "Which quarterback led \"The Drive\" in the 1986 season AFC Championship?",
               &["Dan Marino", "John Elway", "Bernie Kosar", "Jim Kelly"], 1),
            mc("nfl-25", "Which team won Super Bowl LIX?",
               &["Kansas City Chiefs", "Buffalo Bills", "Philadelphia Eagles", "Detroit Lions"], 2),
        ],
    }
}
