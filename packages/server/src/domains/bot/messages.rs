//! Uzbek reply texts shown by the bot.

use telegram::models::{ReplyKeyboardMarkup, SendMessage};

use crate::domains::auth::RejectReason;

pub const CONTACT_BUTTON: &str = "📱 Tasdiqlash kodini olish";

pub const WELCOME: &str = "📱 Telefon raqamingizni tasdiqlash uchun pastdagi tugmani bosing:";

pub const REMINDER: &str = "📱 Tasdiqlash kodi olish uchun pastdagi tugmani bosing:";

pub const GENERIC_FAILURE: &str = "❌ Xatolik yuz berdi. Qaytadan urinib ko'ring.";

pub fn rejection(reason: RejectReason, country_code: &str) -> String {
    match reason {
        RejectReason::NotOwnContact => "❌ Xavfsizlik: Faqat o'z kontaktingizni ulashing!\n\n\
             📱 Boshqa odamning kontaktini ulash taqiqlangan."
            .to_string(),
        RejectReason::UnsupportedNumber => format!(
            "❌ Faqat +{country_code} raqamlari qabul qilinadi.\n\n\
             📱 To'g'ri raqamni ulashing."
        ),
        RejectReason::PhoneClaimed => {
            "❌ Bu raqam boshqa foydalanuvchi tomonidan ro'yxatdan o'tkazilgan.\n\n\
             📱 O'zingizning raqamingizni ulashing."
                .to_string()
        }
    }
}

pub fn code_issued(code: &str, phone_number: &str, ttl_minutes: i64) -> String {
    format!(
        "✅ Kod: *{code}*\n\n📱 Raqam: {phone_number}\n⏰ {ttl_minutes} daqiqada tugaydi"
    )
}

pub fn active_code(code: &str, phone_number: &str) -> String {
    format!("✅ Faol kodingiz bor: *{code}*\n\n📱 Raqam: {phone_number}")
}

/// Every reply carries the share-contact keyboard so the user can always
/// request a fresh code.
pub fn reply(chat_id: i64, text: impl Into<String>) -> SendMessage {
    SendMessage::new(chat_id, text)
        .with_keyboard(ReplyKeyboardMarkup::request_contact(CONTACT_BUTTON))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_carries_contact_keyboard() {
        let message = reply(7, WELCOME);
        let keyboard = message.reply_markup.unwrap();
        assert!(keyboard.keyboard[0][0].request_contact);
        assert_eq!(keyboard.keyboard[0][0].text, CONTACT_BUTTON);
    }

    #[test]
    fn test_unsupported_number_names_country_code() {
        assert!(rejection(RejectReason::UnsupportedNumber, "998").contains("+998"));
    }

    #[test]
    fn test_code_issued_text() {
        let text = code_issued("123456", "+998901234567", 5);
        assert!(text.contains("*123456*"));
        assert!(text.contains("+998901234567"));
        assert!(text.contains("5 daqiqada"));
    }
}
