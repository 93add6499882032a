//! English and Amharic display strings.

use crate::domain::session::{Language, MAX_PIN_ATTEMPTS};
use rust_decimal::Decimal;

/// Shown before a language is known, so it carries both languages.
pub const LANGUAGE_MENU: &str = "Welcome to Mobili Finance.\nእንኳን ደህና መጡ።\n1. English\n2. አማርኛ";
pub const INVALID_LANGUAGE_CHOICE: &str =
    "Invalid choice. Please select 1 or 2.\nልክ ያልሆነ ምርጫ። እባክዎ 1 ወይም 2 ይምረጡ።";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strings {
    language: Language,
}

impl Strings {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    fn pick(&self, en: &'static str, am: &'static str) -> &'static str {
        match self.language {
            Language::En => en,
            Language::Am => am,
        }
    }

    pub fn pin_prompt(&self) -> &'static str {
        self.pick(
            "Welcome to Mobili Finance. Please enter your 4-digit PIN:",
            "እንኳን ወደ ሞቢሊ ፋይናንስ በደህና መጡ። እባክዎ ባለ 4 አሃዝ ፒንዎን ያስገቡ፡",
        )
    }

    pub fn login_success(&self) -> &'static str {
        self.pick("Login successful.", "በተሳካ ሁኔታ ገብተዋል።")
    }

    pub fn home_menu(&self) -> &'static str {
        self.pick(
            "Welcome to Microloan USSD.\n1. Apply for Loan\n2. Check Loan Status\n3. Repay Loan\n4. Check Balance\n5. Transaction History\n6. Change PIN\n0. Exit",
            "እንኳን ወደ ማይክሮ ብድር በደህና መጡ።\n1. ብድር ለመጠየቅ\n2. የብድር ሁኔታ\n3. ብድር ለመክፈል\n4. ቀሪ ሂሳብ\n5. የግብይት ታሪክ\n6. ፒን ለመቀየር\n0. ውጣ",
        )
    }

    pub fn choose_provider(&self) -> &'static str {
        self.pick("Select Loan Provider:", "የብድር አቅራቢ ይምረጡ፡")
    }

    pub fn no_providers(&self) -> &'static str {
        self.pick("No loan providers available.", "ምንም የብድር አቅራቢ የለም።")
    }

    pub fn choose_product(&self) -> &'static str {
        self.pick("Choose a loan product:", "የብድር አይነት ይምረጡ፡")
    }

    pub fn no_products(&self) -> &'static str {
        self.pick("No loan products available.", "ምንም የብድር አይነት የለም።")
    }

    pub fn product_line(&self, ordinal: usize, name: &str, min: Decimal, max: Decimal) -> String {
        match self.language {
            Language::En => format!("{ordinal}. {name} (Amount: {min}-{max})"),
            Language::Am => format!("{ordinal}. {name} (መጠን: {min}-{max})"),
        }
    }

    pub fn enter_amount(&self, min: Decimal, max: Decimal) -> String {
        match self.language {
            Language::En => format!("Enter amount (range: {min}-{max})"),
            Language::Am => format!("የብድር መጠን ያስገቡ ({min}-{max})"),
        }
    }

    pub fn confirm_loan(
        &self,
        provider: &str,
        product: &str,
        amount: Decimal,
        interest: Decimal,
    ) -> String {
        match self.language {
            Language::En => format!(
                "Confirm:\nProvider: {provider}\nProduct: {product}\nAmount: {amount}\nInterest: {interest:.2}\n1. Confirm\n2. Cancel"
            ),
            Language::Am => format!(
                "ያረጋግጡ፡\nአቅራቢ: {provider}\nአይነት: {product}\nመጠን: {amount}\nወለድ: {interest:.2}\n1. አረጋግጥ\n2. ሰርዝ"
            ),
        }
    }

    pub fn loan_status_title(&self) -> &'static str {
        self.pick("Your Loan Status:", "የብድርዎ ሁኔታ፡")
    }

    pub fn no_loans(&self) -> &'static str {
        self.pick("You have no loans.", "ምንም ብድር የለዎትም።")
    }

    pub fn loan_status_line(
        &self,
        ordinal: usize,
        provider: &str,
        product: &str,
        outstanding: Decimal,
    ) -> String {
        match self.language {
            Language::En => {
                format!("{ordinal}. {provider}, {product}, Outstanding: {outstanding:.2}")
            }
            Language::Am => format!("{ordinal}. {provider}, {product}, ቀሪ: {outstanding:.2}"),
        }
    }

    pub fn repay_title(&self) -> &'static str {
        self.pick("Select loan to repay:", "የሚከፍሉትን ብድር ይምረጡ፡")
    }

    pub fn no_repayable_loans(&self) -> &'static str {
        self.pick("No active loans to repay.", "የሚከፈል ንቁ ብድር የለም።")
    }

    pub fn repay_line(
        &self,
        ordinal: usize,
        provider: &str,
        product: &str,
        outstanding: Decimal,
    ) -> String {
        match self.language {
            Language::En => {
                format!("{ordinal}. {provider} - {product} (Outstanding: {outstanding:.2})")
            }
            Language::Am => format!("{ordinal}. {provider} - {product} (ቀሪ: {outstanding:.2})"),
        }
    }

    pub fn enter_repay_amount(&self, outstanding: Decimal) -> String {
        match self.language {
            Language::En => format!("Enter amount to repay (Outstanding: {outstanding:.2})"),
            Language::Am => format!("የሚከፍሉትን መጠን ያስገቡ (ቀሪ: {outstanding:.2})"),
        }
    }

    pub fn history_title(&self) -> &'static str {
        self.pick("Transaction History:", "የግብይት ታሪክ፡")
    }

    pub fn no_transactions(&self) -> &'static str {
        self.pick("No transactions found.", "ምንም ግብይት አልተገኘም።")
    }

    pub fn change_pin_prompt(&self) -> &'static str {
        self.pick("Enter new 4-digit PIN:", "አዲስ ባለ 4 አሃዝ ፒን ያስገቡ፡")
    }

    pub fn nav_home(&self) -> &'static str {
        self.pick("0. Home", "0. ዋና ማውጫ")
    }

    pub fn nav_back(&self) -> &'static str {
        self.pick("99. Back", "99. ተመለስ")
    }

    pub fn nav_more(&self) -> &'static str {
        self.pick("9. More", "9. ተጨማሪ")
    }

    pub fn nav_prev(&self) -> &'static str {
        self.pick("7. Prev", "7. ቀዳሚ")
    }

    pub fn nav_next(&self) -> &'static str {
        self.pick("8. Next", "8. ቀጣይ")
    }

    pub fn balance(&self, balance: Decimal) -> String {
        match self.language {
            Language::En => format!("Your account balance is: {balance:.2}"),
            Language::Am => format!("የሂሳብዎ ቀሪ መጠን: {balance:.2}"),
        }
    }

    pub fn exit_message(&self) -> &'static str {
        self.pick(
            "Thank you for using Microloan USSD.",
            "ማይክሮ ብድርን ስለተጠቀሙ እናመሰግናለን።",
        )
    }

    pub fn loan_success(&self, amount: Decimal, product: &str) -> String {
        match self.language {
            Language::En => format!(
                "Application for {amount:.2} for {product} submitted! Amount credited."
            ),
            Language::Am => format!("የ{amount:.2} የ{product} ማመልከቻ ተልኳል! ገንዘቡ ገቢ ተደርጓል።"),
        }
    }

    pub fn loan_cancelled(&self) -> &'static str {
        self.pick("Loan application cancelled.", "የብድር ማመልከቻው ተሰርዟል።")
    }

    pub fn repayment_success(&self, amount: Decimal) -> String {
        match self.language {
            Language::En => format!("Repayment of {amount:.2} successful."),
            Language::Am => format!("የ{amount:.2} ክፍያ በተሳካ ሁኔታ ተፈጽሟል።"),
        }
    }

    pub fn pin_changed(&self) -> &'static str {
        self.pick("PIN changed successfully.", "ፒንዎ በተሳካ ሁኔታ ተቀይሯል።")
    }

    pub fn not_registered(&self) -> &'static str {
        self.pick(
            "This number is not registered for Mobili Finance.",
            "ይህ ቁጥር በሞቢሊ ፋይናንስ አልተመዘገበም።",
        )
    }

    pub fn not_verified(&self) -> &'static str {
        self.pick(
            "Your account is not verified. Please complete verification to continue.",
            "ሂሳብዎ አልተረጋገጠም። ለመቀጠል እባክዎ ማረጋገጫውን ያጠናቅቁ።",
        )
    }

    pub fn invalid_pin_format(&self) -> &'static str {
        self.pick(
            "Invalid PIN format. Please enter 4 digits.",
            "ልክ ያልሆነ የፒን ቅርጸት። እባክዎ 4 አሃዝ ያስገቡ።",
        )
    }

    pub fn incorrect_pin(&self, attempt: u8) -> String {
        match self.language {
            Language::En => format!("Incorrect PIN. Attempt {attempt} of {MAX_PIN_ATTEMPTS}."),
            Language::Am => format!("የተሳሳተ ፒን። ሙከራ {attempt} ከ{MAX_PIN_ATTEMPTS}።"),
        }
    }

    pub fn too_many_pin_attempts(&self) -> &'static str {
        self.pick(
            "Too many incorrect PIN attempts. Session ended.",
            "ብዙ የተሳሳቱ የፒን ሙከራዎች። ክፍለ ጊዜው ተቋርጧል።",
        )
    }

    pub fn handoff_failed(&self) -> &'static str {
        self.pick(
            "Authentication failed. Session ended.",
            "ማረጋገጫ አልተሳካም። ክፍለ ጊዜው ተቋርጧል።",
        )
    }

    pub fn invalid_choice(&self) -> &'static str {
        self.pick("Invalid choice.", "ልክ ያልሆነ ምርጫ።")
    }

    pub fn has_active_loan(&self) -> &'static str {
        self.pick(
            "You already have an active loan. Please repay it before applying for a new one.",
            "ንቁ ብድር አለዎት። አዲስ ከመጠየቅዎ በፊት እባክዎ ይክፈሉ።",
        )
    }

    pub fn invalid_amount(&self, min: Decimal, max: Decimal) -> String {
        match self.language {
            Language::En => format!("Invalid amount. Enter a number between {min} and {max}."),
            Language::Am => format!("ልክ ያልሆነ መጠን። ከ{min} እስከ {max} ያለ ቁጥር ያስገቡ።"),
        }
    }

    pub fn invalid_repayment(&self, outstanding: Decimal) -> String {
        match self.language {
            Language::En => format!(
                "Invalid amount. Enter an amount greater than 0 and up to {outstanding:.2}."
            ),
            Language::Am => format!("ልክ ያልሆነ መጠን። ከ0 በላይ እና እስከ {outstanding:.2} ያስገቡ።"),
        }
    }

    pub fn product_not_found(&self) -> &'static str {
        self.pick("Error: Product not found.", "ስህተት፡ የብድር አይነቱ አልተገኘም።")
    }

    pub fn loan_not_found(&self) -> &'static str {
        self.pick("Error: Loan not found.", "ስህተት፡ ብድሩ አልተገኘም።")
    }

    pub fn generic_error(&self) -> &'static str {
        self.pick(
            "An error occurred. Please try again.",
            "ስህተት ተፈጥሯል። እባክዎ እንደገና ይሞክሩ።",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_formatted_amounts() {
        let t = Strings::new(Language::En);
        assert_eq!(t.balance(dec!(12500.75)), "Your account balance is: 12500.75");
        assert_eq!(
            t.invalid_amount(dec!(1000), dec!(5000)),
            "Invalid amount. Enter a number between 1000 and 5000."
        );
        assert_eq!(t.incorrect_pin(2), "Incorrect PIN. Attempt 2 of 3.");
    }

    #[test]
    fn test_languages_differ() {
        let en = Strings::new(Language::En);
        let am = Strings::new(Language::Am);
        assert_ne!(en.home_menu(), am.home_menu());
        assert!(am.home_menu().contains("1. "));
    }
}
