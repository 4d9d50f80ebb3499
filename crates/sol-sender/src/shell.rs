//! The interactive send flow.
//!
//! Questions are asked in the order of [`INPUT_SEQUENCE`]. A step with a
//! `depends_on` token kind is skipped unless that kind was chosen, and an
//! answer its validator rejects is reported and asked again. After the
//! summary a yes/no gate (default no) decides whether anything is sent.

use std::sync::Arc;

use chain_sol::{address_to_bytes, parse_secret_key, SolKeypair, NATIVE_MINT};
use owo_colors::OwoColorize;
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::builder::build_transfer;
use crate::error::SenderError;
use crate::prompt::Prompter;
use crate::rpc::SolanaRpc;
use crate::submitter::{submit, ConfirmOptions};
use crate::tokens::{known_mint, known_token, KnownToken, Network, TokenSymbol};
use crate::ui;
use crate::validation::{
    parse_amount, validate_address, validate_amount, validate_mint_address, validate_secret_key,
    validate_send_token_options, ValidationError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    SecretKey,
    Network,
    TokenKind,
    CommonToken,
    CustomMint,
    Recipient,
    Amount,
}

impl Field {
    fn name(self) -> &'static str {
        match self {
            Field::SecretKey => "secret key",
            Field::Network => "network",
            Field::TokenKind => "token kind",
            Field::CommonToken => "common token",
            Field::CustomMint => "custom mint",
            Field::Recipient => "recipient",
            Field::Amount => "amount",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Common,
    Custom,
}

impl TokenKind {
    pub const ALL: [TokenKind; 2] = [TokenKind::Common, TokenKind::Custom];

    pub fn label(self) -> &'static str {
        match self {
            TokenKind::Common => "Common tokens (USDC, USDT, SOL)",
            TokenKind::Custom => "Custom token (enter mint address)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Hidden,
    Select,
    Text,
}

pub type Validator = fn(&str) -> Result<(), ValidationError>;

/// One question of the send flow.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub field: Field,
    pub message: &'static str,
    pub depends_on: Option<TokenKind>,
    pub input: Input,
    pub validator: Option<Validator>,
}

pub const INPUT_SEQUENCE: [Step; 7] = [
    Step {
        field: Field::SecretKey,
        message: "Enter your wallet private key (Base58 or JSON array format):",
        depends_on: None,
        input: Input::Hidden,
        validator: Some(validate_secret_key),
    },
    Step {
        field: Field::Network,
        message: "Select network:",
        depends_on: None,
        input: Input::Select,
        validator: None,
    },
    Step {
        field: Field::TokenKind,
        message: "Choose token type:",
        depends_on: None,
        input: Input::Select,
        validator: None,
    },
    Step {
        field: Field::CommonToken,
        message: "Select token:",
        depends_on: Some(TokenKind::Common),
        input: Input::Select,
        validator: None,
    },
    Step {
        field: Field::CustomMint,
        message: "Enter token mint address:",
        depends_on: Some(TokenKind::Custom),
        input: Input::Text,
        validator: Some(validate_mint_address),
    },
    Step {
        field: Field::Recipient,
        message: "Enter recipient wallet address:",
        depends_on: None,
        input: Input::Text,
        validator: Some(validate_address),
    },
    Step {
        field: Field::Amount,
        message: "Enter amount to send:",
        depends_on: None,
        input: Input::Text,
        validator: Some(validate_amount),
    },
];

/// Answers gathered so far.
#[derive(Default)]
struct Answers {
    secret_key: Option<SecretString>,
    network: Option<Network>,
    token_kind: Option<TokenKind>,
    mint: Option<String>,
    recipient: Option<String>,
    amount: Option<f64>,
}

impl Answers {
    fn applies(&self, step: &Step) -> bool {
        step.depends_on.is_none() || step.depends_on == self.token_kind
    }

    fn network(&self) -> Result<Network, SenderError> {
        self.network
            .ok_or(SenderError::IncompleteInput(Field::Network.name()))
    }

    /// Options and default index for a select step.
    fn choices(&self, field: Field) -> Result<(Vec<String>, usize), SenderError> {
        let options: Vec<String> = match field {
            Field::Network => Network::ALL.iter().map(|n| n.label().to_string()).collect(),
            Field::TokenKind => TokenKind::ALL.iter().map(|k| k.label().to_string()).collect(),
            Field::CommonToken => {
                let network = self.network()?;
                TokenSymbol::ALL
                    .iter()
                    .filter_map(|&symbol| known_token(network, symbol))
                    .map(KnownToken::label)
                    .collect()
            }
            other => return Err(SenderError::IncompleteInput(other.name())),
        };
        Ok((options, 0))
    }

    fn choose(&mut self, field: Field, index: usize) -> Result<(), SenderError> {
        let missing = || SenderError::IncompleteInput(field.name());
        match field {
            Field::Network => self.network = Some(*Network::ALL.get(index).ok_or_else(missing)?),
            Field::TokenKind => {
                self.token_kind = Some(*TokenKind::ALL.get(index).ok_or_else(missing)?)
            }
            Field::CommonToken => {
                let symbol = *TokenSymbol::ALL.get(index).ok_or_else(missing)?;
                let mint = known_mint(self.network()?, symbol).ok_or_else(missing)?;
                self.mint = Some(mint.to_string());
            }
            _ => return Err(missing()),
        }
        Ok(())
    }

    fn record_text(&mut self, field: Field, text: String) -> Result<(), SenderError> {
        match field {
            Field::CustomMint => self.mint = Some(text.trim().to_string()),
            Field::Recipient => self.recipient = Some(text.trim().to_string()),
            Field::Amount => self.amount = Some(parse_amount(&text)?),
            other => return Err(SenderError::IncompleteInput(other.name())),
        }
        Ok(())
    }

    fn into_request(self) -> Result<TransferRequest, SenderError> {
        let missing = |field: Field| SenderError::IncompleteInput(field.name());
        Ok(TransferRequest {
            secret_key: self.secret_key.ok_or(missing(Field::SecretKey))?,
            network: self.network.ok_or(missing(Field::Network))?,
            mint: self.mint.ok_or(missing(Field::CommonToken))?,
            recipient: self.recipient.ok_or(missing(Field::Recipient))?,
            amount: self.amount.ok_or(missing(Field::Amount))?,
        })
    }
}

/// Everything needed to send one transfer.
pub struct TransferRequest {
    secret_key: SecretString,
    network: Network,
    mint: String,
    recipient: String,
    amount: f64,
}

impl TransferRequest {
    pub fn new(
        secret_key: SecretString,
        network: Network,
        mint: impl Into<String>,
        recipient: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            secret_key,
            network,
            mint: mint.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn mint(&self) -> &str {
        &self.mint
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn summary(&self) -> String {
        format!(
            "📋 Transaction Summary:\n   Network: {}\n   Token Mint: {}\n   Recipient: {}\n   Amount: {}",
            self.network, self.mint, self.recipient, self.amount
        )
    }
}

impl std::fmt::Debug for TransferRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferRequest")
            .field("network", &self.network)
            .field("mint", &self.mint)
            .field("recipient", &self.recipient)
            .field("amount", &self.amount)
            .finish_non_exhaustive()
    }
}

fn check(step: &Step, answer: &str) -> Result<(), ValidationError> {
    step.validator.map_or(Ok(()), |validate| validate(answer))
}

/// Walk [`INPUT_SEQUENCE`] and the confirmation gate.
///
/// Returns `None` when the operator declines.
pub fn collect_request(
    prompter: &mut dyn Prompter,
) -> Result<Option<TransferRequest>, SenderError> {
    let mut answers = Answers::default();

    for step in &INPUT_SEQUENCE {
        if !answers.applies(step) {
            continue;
        }
        match step.input {
            Input::Hidden => loop {
                let secret = prompter.password(step.message)?;
                match check(step, secret.expose_secret()) {
                    Ok(()) => {
                        answers.secret_key = Some(secret);
                        break;
                    }
                    Err(e) => prompter.invalid(&e.to_string()),
                }
            },
            Input::Text => loop {
                let text = prompter.input(step.message)?;
                match check(step, &text) {
                    Ok(()) => {
                        answers.record_text(step.field, text)?;
                        break;
                    }
                    Err(e) => prompter.invalid(&e.to_string()),
                }
            },
            Input::Select => {
                let (options, default) = answers.choices(step.field)?;
                let index = prompter.select(step.message, &options, default)?;
                answers.choose(step.field, index)?;
            }
        }
    }

    let request = answers.into_request()?;
    println!("\n{}\n", request.summary().yellow());
    if !prompter.confirm("Continue with this transaction?", false)? {
        println!("{}", "❌ Transaction cancelled".red());
        return Ok(None);
    }
    Ok(Some(request))
}

/// Turn a confirmed request into a submitted, confirmed transfer.
///
/// `connect` is called once, after every local check has passed.
pub async fn send_token<C>(
    request: &TransferRequest,
    connect: C,
    options: &ConfirmOptions,
) -> Result<String, SenderError>
where
    C: FnOnce(Network) -> Result<Arc<dyn SolanaRpc>, SenderError>,
{
    ui::step("🔐 Creating keypair...");
    let parsed = parse_secret_key(request.secret_key.expose_secret())?;
    let keypair = SolKeypair::from_bytes(parsed.as_bytes())?;
    drop(parsed);
    let receiver = address_to_bytes(&request.recipient)?;

    ui::step("✅ Validating transaction parameters...");
    validate_send_token_options(Some(&keypair), Some(&receiver), request.amount, &request.mint)?;

    ui::step("🔗 Connecting to the blockchain...");
    let rpc = connect(request.network)?;
    ui::success(&format!("✅ Connected to the blockchain: {}", rpc.endpoint().cyan()));

    ui::step("📤 Sending transaction for processing...");
    let mint = if request.mint == NATIVE_MINT {
        None
    } else {
        Some(request.mint.as_str())
    };
    let built = build_transfer(rpc.as_ref(), &keypair.pubkey(), &receiver, request.amount, mint).await?;
    let signature = submit(rpc.as_ref(), built, &keypair, options).await?;

    info!(%signature, network = %request.network, "transfer confirmed");
    Ok(signature)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Sent {
        signature: String,
        explorer_url: String,
    },
    Declined,
}

/// Full `send` command: prompts, then the network work.
pub async fn run_send<C>(
    prompter: &mut dyn Prompter,
    connect: C,
    options: &ConfirmOptions,
) -> Result<Outcome, SenderError>
where
    C: FnOnce(Network) -> Result<Arc<dyn SolanaRpc>, SenderError>,
{
    ui::banner("🚀 Solana Token Sender CLI");

    let Some(request) = collect_request(prompter)? else {
        return Ok(Outcome::Declined);
    };

    ui::step("\n🔄 Processing transaction...");
    let signature = send_token(&request, connect, options).await?;
    let explorer_url = request.network.explorer_tx_url(&signature);

    ui::success("\n🎉 Transaction successful!");
    println!("Transaction signature: {}", signature.cyan());
    println!("View on Solana Explorer: {}", explorer_url.blue().underline());

    Ok(Outcome::Sent {
        signature,
        explorer_url,
    })
}

const HELP: &str = "\
🚀 Solana Token Sender CLI Help

Commands:
  send    Send SPL tokens interactively
  help    Show this help information

Usage:
  sol-sender send
  sol-sender help

Security Notes:
  • Never share your private key
  • Always test on devnet first
  • Double-check recipient addresses
";

pub fn help_text() -> &'static str {
    HELP
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use crate::rpc::mock::MockRpc;
    use crate::rpc::{ConfirmationStatus, SignatureStatus};

    const USDC_DEVNET: &str = "4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU";
    const USDT_MAINNET: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";

    fn sender() -> SolKeypair {
        SolKeypair::from_seed(&[11u8; 32])
    }

    fn json_key(keypair: &SolKeypair) -> String {
        let bytes: Vec<String> = keypair.to_bytes().iter().map(u8::to_string).collect();
        format!("[{}]", bytes.join(","))
    }

    fn recipient() -> String {
        SolKeypair::from_seed(&[12u8; 32]).address()
    }

    #[test]
    fn sequence_order_matches_flow() {
        let fields: Vec<Field> = INPUT_SEQUENCE.iter().map(|s| s.field).collect();
        assert_eq!(
            fields,
            vec![
                Field::SecretKey,
                Field::Network,
                Field::TokenKind,
                Field::CommonToken,
                Field::CustomMint,
                Field::Recipient,
                Field::Amount,
            ]
        );
        assert_eq!(INPUT_SEQUENCE[0].input, Input::Hidden);
    }

    #[test]
    fn common_token_path_skips_custom_mint() {
        let mut prompter = ScriptedPrompter::new([
            json_key(&sender()),
            "".into(),
            "".into(),
            "1".into(),
            recipient(),
            "1.5".into(),
            "y".into(),
        ]);

        let request = collect_request(&mut prompter).unwrap().unwrap();

        assert_eq!(request.network(), Network::Devnet);
        assert_eq!(request.mint(), USDC_DEVNET);
        assert_eq!(request.amount(), 1.5);
        assert!(!prompter.asked().iter().any(|q| q == "Enter token mint address:"));
    }

    #[test]
    fn token_picker_resolves_mint_by_symbol() {
        let mut prompter = ScriptedPrompter::new([
            json_key(&sender()),
            "2".into(),
            "1".into(),
            "3".into(),
            recipient(),
            "0.25".into(),
            "y".into(),
        ]);

        let request = collect_request(&mut prompter).unwrap().unwrap();

        assert_eq!(request.network(), Network::Mainnet);
        assert_eq!(
            Some(request.mint()),
            known_mint(Network::Mainnet, TokenSymbol::Sol)
        );
        assert_eq!(request.mint(), NATIVE_MINT);
    }

    #[test]
    fn custom_mint_path_skips_token_picker() {
        let mut prompter = ScriptedPrompter::new([
            json_key(&sender()),
            "2".into(),
            "2".into(),
            USDT_MAINNET.into(),
            recipient(),
            "10".into(),
            "yes".into(),
        ]);

        let request = collect_request(&mut prompter).unwrap().unwrap();

        assert_eq!(request.network(), Network::Mainnet);
        assert_eq!(request.mint(), USDT_MAINNET);
        assert!(!prompter.asked().iter().any(|q| q == "Select token:"));
    }

    #[test]
    fn invalid_answers_are_asked_again() {
        let mut prompter = ScriptedPrompter::new([
            "[1,2,3]".into(),
            json_key(&sender()),
            "".into(),
            "2".into(),
            "not-a-mint".into(),
            NATIVE_MINT.into(),
            "0x1234".into(),
            recipient(),
            "0".into(),
            "abc".into(),
            "0.25".into(),
            "y".into(),
        ]);

        let request = collect_request(&mut prompter).unwrap().unwrap();

        assert_eq!(request.amount(), 0.25);
        assert_eq!(request.mint(), NATIVE_MINT);
        assert_eq!(
            prompter.rejections(),
            [
                "Invalid private key format. Must be Base58 or JSON array format",
                "Please enter a valid token mint address",
                "Please enter a valid Solana public key",
                "Please enter a valid positive number",
                "Please enter a valid positive number",
            ]
        );
    }

    #[test]
    fn gate_defaults_to_no() {
        let mut prompter = ScriptedPrompter::new([
            json_key(&sender()),
            "".into(),
            "".into(),
            "3".into(),
            recipient(),
            "1".into(),
            "".into(),
        ]);

        assert!(collect_request(&mut prompter).unwrap().is_none());
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn request_debug_hides_secret() {
        let key = json_key(&sender());
        let request = TransferRequest::new(
            SecretString::from(key.clone()),
            Network::Devnet,
            NATIVE_MINT,
            recipient(),
            1.0,
        );
        let debug = format!("{request:?}");
        assert!(!debug.contains(&key));
        assert!(debug.contains("Devnet"));
    }

    #[test]
    fn summary_lists_transfer() {
        let request = TransferRequest::new(
            SecretString::from("x".to_string()),
            Network::Mainnet,
            USDT_MAINNET,
            "Recipient111",
            4.2,
        );
        let summary = request.summary();
        assert!(summary.contains("Network: mainnet"));
        assert!(summary.contains(&format!("Token Mint: {USDT_MAINNET}")));
        assert!(summary.contains("Recipient: Recipient111"));
        assert!(summary.contains("Amount: 4.2"));
    }

    #[tokio::test(start_paused = true)]
    async fn sentinel_mint_sends_native_sol() {
        let request = TransferRequest::new(
            SecretString::from(json_key(&sender())),
            Network::Devnet,
            NATIVE_MINT,
            recipient(),
            2.5,
        );
        let rpc = Arc::new(MockRpc::new().with_statuses(vec![Some(SignatureStatus {
            err: None,
            confirmation_status: Some(ConfirmationStatus::Confirmed),
        })]));

        let handle = rpc.clone();
        let signature = send_token(
            &request,
            move |_| Ok(handle as Arc<dyn SolanaRpc>),
            &ConfirmOptions::default(),
        )
        .await
        .unwrap();

        let sent = rpc.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(signature, bs58::encode(&sent[0][1..65]).into_string());
        // System transfer data: u32 LE 2, then lamports.
        assert!(sent[0]
            .windows(12)
            .any(|w| w[..4] == 2u32.to_le_bytes() && w[4..] == 2_500_000_000u64.to_le_bytes()));
    }

    #[tokio::test]
    async fn bad_recipient_fails_before_connecting() {
        let request = TransferRequest::new(
            SecretString::from(json_key(&sender())),
            Network::Devnet,
            NATIVE_MINT,
            "not a key",
            1.0,
        );

        let err = send_token(
            &request,
            |_| panic!("connected with an invalid request"),
            &ConfirmOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SenderError::Sol(_)));
    }

    #[test]
    fn help_mentions_commands_and_safety() {
        let help = help_text();
        assert!(help.contains("send"));
        assert!(help.contains("Never share your private key"));
        assert!(help.contains("Always test on devnet first"));
        assert!(help.contains("Double-check recipient addresses"));
    }
}
