//! The fixed question list and per-step keyboards.
//!
//! The flow is a 19-step Uzbek-language job application form. Steps 0..17
//! expect text; the final step expects a photo. A handful of steps offer a
//! reply keyboard with suggested answers, but any text is accepted — the
//! keyboard is presentation only, never validation.

/// Ordered question prompts. Index == step.
pub const QUESTIONS: [&str; 19] = [
    "Ismi Familiyasi:",
    "Tug‘ilgan yili:",
    "Telefon (+998):",
    "Sohangizni tanlang:",
    "To‘liq manzili:",
    "Millati:",
    "Ma'lumoti:",
    "Oilaviy holati:",
    "Tajribangiz haqida yozing:",
    "Oldingi ish joyingizni yozing:",
    "Excel, Word bilish darajasi (0-100%):",
    "Til bilish darajasi Rus, Eng:",
    "Shaxsiy mashinagiz bormi:",
    "Qancha maoshga ishlamoqchisiz?",
    "Qancha vaqt ishlamoqchisiz?",
    "Sudlanganmisiz?",
    "Telegram username'ingizni kiriting @xxxx:",
    "Qayerdan eshitdingiz?",
    "Iltimos, rasimingizni yuboring: (rasimingizni yubormasangiz ariza qabul qilinmaydi!)",
];

/// Step that expects a photo instead of text.
pub const PHOTO_STEP: usize = 18;

/// Step whose answer is surfaced as the applicant's Telegram username.
pub const USERNAME_STEP: usize = 16;

/// Suggested-answer button rows for a step, if it has any.
pub fn keyboard_for(step: usize) -> Option<Vec<Vec<String>>> {
    let rows: &[&[&str]] = match step {
        3 => &[
            &["Registratura xodimi", "Hamshira ( kunduzgi va navbatchilikka)"],
            &["Call center operator"],
            &["Farrosh"],
        ],
        5 => &[&["O'zbek", "Rus"], &["Boshqa millat"]],
        6 => &[&["Oliy", "O‘rta"], &["Texnikum", "O‘qiyapman"]],
        7 => &[&["Turmush qurgan", "Turmush qurmagan"]],
        12 | 15 => &[&["Ha", "Yo‘q"]],
        _ => return None,
    };
    Some(
        rows.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect(),
    )
}
