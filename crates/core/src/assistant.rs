//! Scripted help-desk assistant ("Bookworm")
//!
//! Classifies a chat message into one of a handful of intents with ordered
//! regular expressions and answers with a canned reply for that intent.

use std::sync::OnceLock;

use rand::seq::IndexedRandom;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Recommend,
    Upload,
    Exchange,
    Profile,
    Fallback,
}

// First match wins.
const INTENT_PATTERNS: &[(Intent, &str)] = &[
    (Intent::Greeting, r"^(hi|hello|hey)"),
    (Intent::Recommend, r"recommend|suggestion|good book"),
    (Intent::Upload, r"how.*(upload|add|share|post|create).*book"),
    (Intent::Exchange, r"how.*(exchange|swap|trade|request)"),
    (Intent::Profile, r"how.*(profile|account|name|picture|photo|bio)"),
];

const GREETING_REPLIES: &[&str] = &[
    "Hello! I'm Bookworm, the BookXchange assistant. What can I help you with?",
    "Hi there! Ask me anything about using BookXchange.",
    "Welcome to BookXchange! Bookworm here, ready to help.",
];

const RECOMMEND_REPLIES: &[&str] = &[
    "Readers here have been swapping 'The Silent Patient', 'Where the Crawdads Sing' and 'Atomic Habits'.",
    "You could try 'Project Hail Mary', 'The Midnight Library' or 'Educated'.",
    "Worth a look: 'The Four Winds', 'The Thursday Murder Club' or 'Klara and the Sun'.",
];

const UPLOAD_REPLIES: &[&str] = &[
    "To list a book, open your Dashboard, choose 'Add New Book', fill in the details with a photo and submit.",
    "Listing is quick: Dashboard, then 'Add New Book', then the book's details and a cover image, then submit.",
    "Head to Dashboard and pick 'Add New Book'. Add the details and a clear photo, then save it.",
];

const EXCHANGE_REPLIES: &[&str] = &[
    "Find a book you like, press 'Request Exchange' and leave the owner a message. They can accept or decline.",
    "Browse the catalog, open a book and choose 'Request Exchange'. The owner will answer your request.",
    "Pick a book, send an exchange request with a short note, and wait for the owner's reply.",
];

const PROFILE_REPLIES: &[&str] = &[
    "Open your Profile page and choose 'Edit Profile' to change your display name, bio or picture.",
    "Your display name, bio and photo can all be changed from Profile, then 'Edit Profile'.",
    "Go to Profile, press 'Edit Profile', update your details and save.",
];

const FALLBACK_REPLIES: &[&str] = &[
    "Sorry, I didn't follow that. I can help with recommendations, listing or exchanging books, and your profile.",
    "I didn't catch that. Try asking about recommendations, uploading a book, exchanges or your profile.",
    "I'm still learning! Could you rephrase? Recommendations, uploads, exchanges and profiles are my specialties.",
];

impl Intent {
    pub fn replies(&self) -> &'static [&'static str] {
        match self {
            Self::Greeting => GREETING_REPLIES,
            Self::Recommend => RECOMMEND_REPLIES,
            Self::Upload => UPLOAD_REPLIES,
            Self::Exchange => EXCHANGE_REPLIES,
            Self::Profile => PROFILE_REPLIES,
            Self::Fallback => FALLBACK_REPLIES,
        }
    }
}

fn intent_rules() -> &'static [(Intent, Regex)] {
    static RULES: OnceLock<Vec<(Intent, Regex)>> = OnceLock::new();
    RULES.get_or_init(|| {
        INTENT_PATTERNS
            .iter()
            .filter_map(|(intent, pattern)| Regex::new(pattern).ok().map(|re| (*intent, re)))
            .collect()
    })
}

pub fn recognize_intent(message: &str) -> Intent {
    let lowered = message.to_lowercase();
    intent_rules()
        .iter()
        .find(|(_, pattern)| pattern.is_match(&lowered))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::Fallback)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub intent: Intent,
    pub text: String,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Assistant;

impl Assistant {
    pub fn new() -> Self {
        Self
    }

    /// Opening line for a fresh conversation.
    pub fn greeting<R: Rng>(&self, rng: &mut R) -> AssistantReply {
        self.reply_for(Intent::Greeting, rng)
    }

    pub fn reply<R: Rng>(&self, message: &str, rng: &mut R) -> AssistantReply {
        self.reply_for(recognize_intent(message), rng)
    }

    fn reply_for<R: Rng>(&self, intent: Intent, rng: &mut R) -> AssistantReply {
        let text = intent
            .replies()
            .choose(rng)
            .or_else(|| FALLBACK_REPLIES.first())
            .copied()
            .unwrap_or_default()
            .to_string();
        AssistantReply { intent, text }
    }
}
