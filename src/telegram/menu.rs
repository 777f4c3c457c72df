//! Canned menu texts, reply/inline keyboards, and the text → action mapping.
//!
//! Everything here is static configuration: button labels, reply copy, and
//! the outbound links. The bot never personalizes a reply from history.

use once_cell::sync::Lazy;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup as ReplyKeyboardMarkup,
};
use url::Url;

/// Main-menu button labels (reply keyboard).
pub const BTN_CONSULTATION: &str = "Consultation & personalized help";
pub const BTN_JOBS: &str = "Job openings/referrals";
pub const BTN_FREE_PDF: &str = "Get free PDF";
pub const BTN_CONTACT_US: &str = "Contact Us";
pub const BTN_AI_CHAT: &str = "AI Chatbot";
pub const BTN_END_CHAT: &str = "End chat";

/// Challenge options shown after "Consultation & personalized help".
pub const CHALLENGE_OPTIONS: [&str; 5] = [
    "🔹 Not getting interviews",
    "🔹 Not getting shortlisted",
    "🔹 Low salary / stuck role",
    "🔹 Confused about upskilling",
    "🔹 Other",
];

pub const WELCOME_TEXT: &str = "Hey user, Gerry's Bot this side 👋\n\nWelcome to our Data Career Support bot.\n\nPlease choose one of the following:";

pub const CHALLENGE_PROMPT: &str =
    "Before we begin, could you share your biggest challenge right now?\n(Select one)";

pub const CONSULT_PITCH: &str = "Thanks for sharing! 🙌\n\nHere's how we can support you 🚀\n\nGerryson Mehta has 7+ years of experience in data analytics across companies like Coinbase, Mobikwik, and Tech Mahindra.\nHe specializes in SQL, Tableau, Power BI, and Snowflake—helping professionals transition into higher-paying analytics roles and secure global opportunities.\n\n✨ Use code FIRST1000 to get 90% off your first call! ✨";

pub const FOLLOWUP_TEXT: &str =
    "Do you have any other queries you'd like help with?\nFeel free to explore more or end the chat below 👇";

pub const RESOURCES_TEXT: &str =
    "Thanks for connecting! 🙏\nYou can explore more resources at:\n🌐 www.gerrysonmehta.com";

pub const JOBS_TEXT: &str =
    "Great! 🎯 Tap below to join our WhatsApp community for curated job openings and referrals.";

pub const FREE_PDF_TEXT: &str =
    "Here's your free resource to help you level up in data analytics! 🚀\nTap below to download:";

pub const CONTACT_US_TEXT: &str = "Tap below to reach out to us:";

pub const AI_CHAT_TEXT: &str = "Our AI career assistant is on its way! 🤖\nUntil it launches, pick any option from the menu below or book a 1:1 consult for personalized help.";

pub const END_CHAT_TEXT: &str =
    "Chat ended ✅\nFeel free to restart anytime by typing /start.\nWishing you success ahead! 🚀";

static CONSULT_CALL_URL: Lazy<Url> = Lazy::new(|| {
    Url::parse("https://topmate.io/gerryson/870539").expect("static consult link is a valid URL")
});

static WHATSAPP_GROUP_URL: Lazy<Url> = Lazy::new(|| {
    Url::parse("https://whatsapp.com/channel/0029VamouNm5Ejy6enHyEd29")
        .expect("static WhatsApp link is a valid URL")
});

static FREE_PDF_URL: Lazy<Url> = Lazy::new(|| {
    Url::parse("https://docs.google.com/document/d/e/2PACX-1vTOhSl0g3Q1K_44w5OJFlyBDkOEraufV3sxtojvuQZeIE7S_ptwk0FGjfMi2mohSJ5qgt3-Tw3KbH48/pub")
        .expect("static PDF link is a valid URL")
});

static CONTACT_FORM_URL: Lazy<Url> = Lazy::new(|| {
    Url::parse("https://forms.gle/E3hs5TrJuT7zVGMZ6").expect("static contact link is a valid URL")
});

/// One menu selection, decoded from an inbound message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    Consultation,
    /// One of the [`CHALLENGE_OPTIONS`], carried verbatim.
    Challenge(String),
    Jobs,
    FreePdf,
    ContactUs,
    AiChat,
    EndChat,
}

impl MenuAction {
    /// Maps a message text to the one matching menu action, if any.
    /// Unmatched text is not an error; the dispatcher ignores it.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            BTN_CONSULTATION => Some(MenuAction::Consultation),
            BTN_JOBS => Some(MenuAction::Jobs),
            BTN_FREE_PDF => Some(MenuAction::FreePdf),
            BTN_CONTACT_US => Some(MenuAction::ContactUs),
            BTN_AI_CHAT => Some(MenuAction::AiChat),
            BTN_END_CHAT => Some(MenuAction::EndChat),
            other if CHALLENGE_OPTIONS.contains(&other) => {
                Some(MenuAction::Challenge(other.to_string()))
            }
            _ => None,
        }
    }
}

/// Main reply keyboard shown by /start and after each completed flow.
pub fn main_keyboard() -> ReplyKeyboardMarkup {
    ReplyKeyboardMarkup::new(vec![
        vec![KeyboardButton::new(BTN_CONSULTATION)],
        vec![KeyboardButton::new(BTN_JOBS), KeyboardButton::new(BTN_FREE_PDF)],
        vec![KeyboardButton::new(BTN_CONTACT_US), KeyboardButton::new(BTN_AI_CHAT)],
        vec![KeyboardButton::new(BTN_END_CHAT)],
    ])
    .resize_keyboard()
}

/// Challenge-option keyboard, one option per row.
pub fn challenge_keyboard() -> ReplyKeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = CHALLENGE_OPTIONS
        .iter()
        .map(|option| vec![KeyboardButton::new(*option)])
        .collect();
    ReplyKeyboardMarkup::new(rows).resize_keyboard()
}

pub fn consult_link_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        "📞 Book Your 1:1 Consult Call",
        CONSULT_CALL_URL.clone(),
    )]])
}

pub fn jobs_link_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        "🔗 Join WhatsApp Group",
        WHATSAPP_GROUP_URL.clone(),
    )]])
}

pub fn pdf_link_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        "📘 Download Free PDF",
        FREE_PDF_URL.clone(),
    )]])
}

pub fn contact_link_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        "📬 Contact Us Form",
        CONTACT_FORM_URL.clone(),
    )]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_main_button_parses_to_its_action() {
        assert_eq!(MenuAction::parse(BTN_CONSULTATION), Some(MenuAction::Consultation));
        assert_eq!(MenuAction::parse(BTN_JOBS), Some(MenuAction::Jobs));
        assert_eq!(MenuAction::parse(BTN_FREE_PDF), Some(MenuAction::FreePdf));
        assert_eq!(MenuAction::parse(BTN_CONTACT_US), Some(MenuAction::ContactUs));
        assert_eq!(MenuAction::parse(BTN_AI_CHAT), Some(MenuAction::AiChat));
        assert_eq!(MenuAction::parse(BTN_END_CHAT), Some(MenuAction::EndChat));
    }

    #[test]
    fn challenge_options_parse_verbatim() {
        for option in CHALLENGE_OPTIONS {
            assert_eq!(
                MenuAction::parse(option),
                Some(MenuAction::Challenge(option.to_string()))
            );
        }
    }

    #[test]
    fn free_text_does_not_match() {
        assert_eq!(MenuAction::parse("hello there"), None);
        assert_eq!(MenuAction::parse("/start"), None);
        // close, but not an exact label match
        assert_eq!(MenuAction::parse("consultation & personalized help"), None);
    }

    #[test]
    fn main_keyboard_carries_all_six_buttons() {
        let keyboard = main_keyboard();
        let labels: Vec<String> = keyboard
            .keyboard
            .iter()
            .flatten()
            .map(|btn| btn.text.clone())
            .collect();
        assert_eq!(labels.len(), 6);
        for label in [BTN_CONSULTATION, BTN_JOBS, BTN_FREE_PDF, BTN_CONTACT_US, BTN_AI_CHAT, BTN_END_CHAT] {
            assert!(labels.iter().any(|l| l == label), "missing button {label}");
        }
    }

    #[test]
    fn challenge_keyboard_has_one_option_per_row() {
        let keyboard = challenge_keyboard();
        assert_eq!(keyboard.keyboard.len(), CHALLENGE_OPTIONS.len());
        assert!(keyboard.keyboard.iter().all(|row| row.len() == 1));
    }
}
