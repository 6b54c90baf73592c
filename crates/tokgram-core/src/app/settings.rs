//! Settings - プライバシー / アクセシビリティ / クリエイター残高
//!
//! # 学習ポイント
//!
//! ## 1. 検証の順番はユーザー体験
//! 出金は 金額の形式 → 残高 → 送金先 の順で検証する。UPI が壊れて
//! いても、まず金額エラーを出す(先に見える入力から直してもらう)。
//!
//! ## 2. 確認ダイアログは副作用の直前
//! confirm が false なら残高は 1 セントも動かない。確認済みのときだけ
//! 減算し、その後に領収メッセージを出す。

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::ports::notifier::Notifier;

/// Version string shown in the settings footer.
pub const APP_VERSION: &str = "TokGram AI v1.3.0";

/// Creator balance every fresh account starts from.
pub const WALLET_SEED_BALANCE: f64 = 1240.50;

pub const WITHDRAW_RECEIPT: &str =
    "Withdrawal initiated! Funds should arrive in 2-3 business days.";

/// アカウントのプライバシー設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivacySettings {
    /// 承認したフォロワーだけが投稿を見られる
    pub is_private: bool,
    /// 最終アクティブ時刻をフォロー中の相手に見せる
    pub activity_status: bool,
    pub two_factor: bool,
    /// 攻撃的な語を含むコメントを隠す
    pub hidden_words: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            is_private: false,
            activity_status: true,
            two_factor: false,
            hidden_words: true,
        }
    }
}

/// このデバイスだけに効く表示設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessibilitySettings {
    pub captions: bool,
    pub reduce_motion: bool,
    pub high_contrast: bool,
    pub dark_mode: bool,
    pub screen_reader: bool,
}

impl Default for AccessibilitySettings {
    fn default() -> Self {
        Self {
            captions: true,
            reduce_motion: false,
            high_contrast: false,
            dark_mode: true,
            screen_reader: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyToggle {
    PrivateAccount,
    ActivityStatus,
    TwoFactor,
    HiddenWords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessibilityToggle {
    Captions,
    ReduceMotion,
    HighContrast,
    DarkMode,
    ScreenReader,
}

/// 収益化プログラムの達成状況
///
/// 数値はプロフィールの実績から写した固定シード。全条件を満たした
/// ときだけ申請できる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonetizationEligibility {
    pub followers: u64,
    pub required_followers: u64,
    pub views_30d: u64,
    pub required_views: u64,
    pub posts_this_month: u32,
    pub required_posts: u32,
    pub policy_compliant: bool,
    pub age_verified: bool,
}

impl Default for MonetizationEligibility {
    fn default() -> Self {
        Self {
            followers: 1_200_000,
            required_followers: 5_000,
            views_30d: 845_000,
            required_views: 1_000_000,
            posts_this_month: 12,
            required_posts: 20,
            policy_compliant: true,
            age_verified: true,
        }
    }
}

impl MonetizationEligibility {
    pub fn followers_met(&self) -> bool {
        self.followers >= self.required_followers
    }

    pub fn views_met(&self) -> bool {
        self.views_30d >= self.required_views
    }

    pub fn posts_met(&self) -> bool {
        self.posts_this_month >= self.required_posts
    }

    /// Eligible only when every requirement is met.
    pub fn is_eligible(&self) -> bool {
        self.followers_met()
            && self.views_met()
            && self.posts_met()
            && self.policy_compliant
            && self.age_verified
    }

    /// Progress toward the follower requirement, capped at 1.0.
    pub fn follower_progress(&self) -> f64 {
        progress(self.followers, self.required_followers)
    }

    /// Progress toward the 30-day view requirement, capped at 1.0.
    pub fn view_progress(&self) -> f64 {
        progress(self.views_30d, self.required_views)
    }
}

fn progress(have: u64, need: u64) -> f64 {
    if need == 0 {
        return 1.0;
    }
    (have as f64 / need as f64).min(1.0)
}

/// 出金先
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayoutMethod {
    Bank,
    PayPal,
    Upi(String),
}

impl PayoutMethod {
    /// Human-readable destination used in the confirmation prompt.
    fn destination(&self) -> String {
        match self {
            PayoutMethod::Bank => "Bank Account (**** 1234)".to_string(),
            PayoutMethod::PayPal => "PayPal".to_string(),
            PayoutMethod::Upi(id) => format!("UPI ID ({id})"),
        }
    }
}

/// 出金が弾かれた理由。Display がそのまま alert 文面になる。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WithdrawError {
    #[error("Please enter a valid amount.")]
    InvalidAmount,

    #[error("Insufficient funds.")]
    InsufficientFunds,

    #[error("Please enter a valid UPI ID (e.g., user@bank)")]
    InvalidUpiId,
}

#[derive(Debug, Clone, Copy, Default)]
struct SettingsState {
    privacy: PrivacySettings,
    accessibility: AccessibilitySettings,
    eligibility: MonetizationEligibility,
}

/// Settings surface: toggles, monetization status, and the wallet.
///
/// Cloneable handle; clones share the same state.
#[derive(Clone)]
pub struct SettingsPanel {
    notifier: Arc<dyn Notifier>,
    state: Arc<Mutex<SettingsState>>,
    balance: Arc<Mutex<f64>>,
}

impl SettingsPanel {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            state: Arc::new(Mutex::new(SettingsState::default())),
            balance: Arc::new(Mutex::new(WALLET_SEED_BALANCE)),
        }
    }

    pub fn privacy(&self) -> PrivacySettings {
        self.state
            .lock()
            .map(|s| s.privacy)
            .unwrap_or_default()
    }

    pub fn accessibility(&self) -> AccessibilitySettings {
        self.state
            .lock()
            .map(|s| s.accessibility)
            .unwrap_or_default()
    }

    pub fn eligibility(&self) -> MonetizationEligibility {
        self.state
            .lock()
            .map(|s| s.eligibility)
            .unwrap_or_default()
    }

    /// Flip one privacy switch; returns the new value.
    pub fn toggle_privacy(&self, toggle: PrivacyToggle) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        let field = match toggle {
            PrivacyToggle::PrivateAccount => &mut state.privacy.is_private,
            PrivacyToggle::ActivityStatus => &mut state.privacy.activity_status,
            PrivacyToggle::TwoFactor => &mut state.privacy.two_factor,
            PrivacyToggle::HiddenWords => &mut state.privacy.hidden_words,
        };
        *field = !*field;
        *field
    }

    /// Flip one accessibility switch; returns the new value.
    pub fn toggle_accessibility(&self, toggle: AccessibilityToggle) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        let field = match toggle {
            AccessibilityToggle::Captions => &mut state.accessibility.captions,
            AccessibilityToggle::ReduceMotion => &mut state.accessibility.reduce_motion,
            AccessibilityToggle::HighContrast => &mut state.accessibility.high_contrast,
            AccessibilityToggle::DarkMode => &mut state.accessibility.dark_mode,
            AccessibilityToggle::ScreenReader => &mut state.accessibility.screen_reader,
        };
        *field = !*field;
        *field
    }

    /// Current creator balance.
    pub fn balance(&self) -> f64 {
        self.balance
            .lock()
            .map(|b| *b)
            .unwrap_or(0.0)
    }

    /// Withdraw funds to the chosen payout method.
    ///
    /// `amount` is the raw text the user typed. Validation runs in display
    /// order (amount, balance, destination), each failure alerts with the
    /// matching message and leaves the balance untouched. A declined
    /// confirmation returns `Ok(None)` with no alert.
    pub fn withdraw(
        &self,
        amount: &str,
        method: PayoutMethod,
    ) -> Result<Option<f64>, WithdrawError> {
        let parsed = amount.trim().parse::<f64>().ok();
        let amount = match parsed {
            Some(value) if value.is_finite() && value > 0.0 => value,
            _ => return Err(self.reject(WithdrawError::InvalidAmount)),
        };

        if amount > self.balance() {
            return Err(self.reject(WithdrawError::InsufficientFunds));
        }

        if let PayoutMethod::Upi(id) = &method {
            if id.trim().is_empty() || !id.contains('@') {
                return Err(self.reject(WithdrawError::InvalidUpiId));
            }
        }

        let prompt = format!("Withdraw ${amount:.2} to your {}?", method.destination());
        if !self.notifier.confirm(&prompt) {
            return Ok(None);
        }

        let remaining = {
            let Ok(mut balance) = self.balance.lock() else {
                return Ok(None);
            };
            *balance -= amount;
            *balance
        };
        self.notifier.alert(WITHDRAW_RECEIPT);
        Ok(Some(remaining))
    }

    fn reject(&self, err: WithdrawError) -> WithdrawError {
        self.notifier.alert(&err.to_string());
        err
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::ports::notifier::RecordingNotifier;

    fn panel() -> (SettingsPanel, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        (SettingsPanel::new(notifier.clone()), notifier)
    }

    #[test]
    fn default_toggles_match_a_fresh_account() {
        let (panel, _) = panel();
        let privacy = panel.privacy();
        assert!(!privacy.is_private);
        assert!(privacy.activity_status);
        assert!(!privacy.two_factor);
        assert!(privacy.hidden_words);

        let access = panel.accessibility();
        assert!(access.captions);
        assert!(!access.reduce_motion);
        assert!(!access.high_contrast);
        assert!(access.dark_mode);
        assert!(access.screen_reader);
    }

    #[test]
    fn toggles_flip_and_report_the_new_value() {
        let (panel, _) = panel();
        assert!(panel.toggle_privacy(PrivacyToggle::PrivateAccount));
        assert!(panel.privacy().is_private);
        assert!(!panel.toggle_privacy(PrivacyToggle::PrivateAccount));

        assert!(!panel.toggle_accessibility(AccessibilityToggle::Captions));
        assert!(!panel.accessibility().captions);
        assert!(panel.toggle_accessibility(AccessibilityToggle::ReduceMotion));
    }

    #[test]
    fn seeded_account_is_not_yet_eligible() {
        let (panel, _) = panel();
        let eligibility = panel.eligibility();
        assert!(eligibility.followers_met());
        assert!(!eligibility.views_met());
        assert!(!eligibility.posts_met());
        assert!(!eligibility.is_eligible());
        assert_eq!(eligibility.follower_progress(), 1.0);
        assert_eq!(eligibility.view_progress(), 0.845);
    }

    #[test]
    fn meeting_every_requirement_makes_the_account_eligible() {
        let eligibility = MonetizationEligibility {
            views_30d: 1_000_000,
            posts_this_month: 20,
            ..MonetizationEligibility::default()
        };
        assert!(eligibility.is_eligible());
    }

    #[test]
    fn withdraw_happy_path_confirms_then_debits() {
        let (panel, notifier) = panel();

        let remaining = panel
            .withdraw("240.50", PayoutMethod::Upi("me@bank".to_string()))
            .unwrap()
            .unwrap();

        assert_eq!(remaining, 1000.0);
        assert_eq!(panel.balance(), 1000.0);
        assert_eq!(
            notifier.prompts(),
            vec!["Withdraw $240.50 to your UPI ID (me@bank)?"]
        );
        assert_eq!(notifier.alerts(), vec![WITHDRAW_RECEIPT]);
    }

    #[test]
    fn bank_and_paypal_destinations_appear_in_the_prompt() {
        let (panel, notifier) = panel();
        panel.withdraw("100", PayoutMethod::Bank).unwrap();
        panel.withdraw("100", PayoutMethod::PayPal).unwrap();

        assert_eq!(
            notifier.prompts(),
            vec![
                "Withdraw $100.00 to your Bank Account (**** 1234)?",
                "Withdraw $100.00 to your PayPal?",
            ]
        );
        assert_eq!(panel.balance(), 1040.50);
    }

    #[rstest]
    #[case::empty("")]
    #[case::not_a_number("abc")]
    #[case::negative("-5")]
    #[case::zero("0")]
    #[case::nan("NaN")]
    fn non_numeric_and_non_positive_amounts_are_rejected(#[case] input: &str) {
        let (panel, notifier) = panel();

        let err = panel.withdraw(input, PayoutMethod::Bank).unwrap_err();
        assert_eq!(err, WithdrawError::InvalidAmount);
        assert_eq!(notifier.alerts(), vec!["Please enter a valid amount."]);
        assert!(notifier.prompts().is_empty(), "no confirmation on failure");
        assert_eq!(panel.balance(), WALLET_SEED_BALANCE);
    }

    #[test]
    fn overdraft_is_rejected() {
        let (panel, notifier) = panel();
        let err = panel.withdraw("2000", PayoutMethod::Bank).unwrap_err();
        assert_eq!(err, WithdrawError::InsufficientFunds);
        assert_eq!(notifier.alerts(), vec!["Insufficient funds."]);
        assert_eq!(panel.balance(), WALLET_SEED_BALANCE);
    }

    #[test]
    fn upi_id_must_contain_an_at_sign() {
        let (panel, notifier) = panel();

        for id in ["", "   ", "plainname"] {
            let err = panel
                .withdraw("50", PayoutMethod::Upi(id.to_string()))
                .unwrap_err();
            assert_eq!(err, WithdrawError::InvalidUpiId, "id: {id:?}");
        }
        assert_eq!(
            notifier.alerts(),
            vec!["Please enter a valid UPI ID (e.g., user@bank)"; 3]
        );
        assert_eq!(panel.balance(), WALLET_SEED_BALANCE);
    }

    #[test]
    fn amount_errors_win_over_destination_errors() {
        // both the amount and the UPI id are bad; the amount message shows
        let (panel, notifier) = panel();
        let err = panel
            .withdraw("oops", PayoutMethod::Upi("nobody".to_string()))
            .unwrap_err();
        assert_eq!(err, WithdrawError::InvalidAmount);
        assert_eq!(notifier.alerts(), vec!["Please enter a valid amount."]);
    }

    #[test]
    fn declined_confirmation_keeps_the_balance() {
        let notifier = Arc::new(RecordingNotifier::with_default_answer(false));
        let panel = SettingsPanel::new(notifier.clone());

        let outcome = panel.withdraw("500", PayoutMethod::Bank).unwrap();
        assert_eq!(outcome, None);
        assert_eq!(panel.balance(), WALLET_SEED_BALANCE);
        // prompted, but no receipt
        assert_eq!(notifier.prompts().len(), 1);
        assert!(notifier.alerts().is_empty());
    }
}
