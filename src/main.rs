use anyhow::{Context, Result};
use beneficiary_core::{
    format_iban, init_tracing, AccountValidationService, BankRegistry, BeneficiaryWizard,
    InMemoryBeneficiaryStore, MockHolderLookup, RecordingNavigator, Relationship,
    StaticLocalizer, TransferPurpose, ValidationConfig, WizardStep, VERSION,
};
use std::env;
use std::sync::Arc;

// Optional overrides for config and bank seed data
const CONFIG_ENV: &str = "BENEFICIARY_CONFIG";
const BANKS_ENV: &str = "BENEFICIARY_BANKS";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("validate") => {
            let input = args
                .get(2)
                .context("usage: beneficiary-core validate <iban|account> [SWIFT]")?;
            run_validate(input, args.get(3).map(String::as_str)).await?;
        }
        Some("banks") => run_banks()?,
        Some("demo") => run_demo(args.get(2).map(String::as_str).unwrap_or("en")).await?,
        _ => print_usage(),
    }

    Ok(())
}

fn print_usage() {
    println!("🏦 Beneficiary Core v{}", VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Usage:");
    println!("  beneficiary-core validate <iban|account> [SWIFT]");
    println!("  beneficiary-core banks");
    println!("  beneficiary-core demo [en|ar]");
    println!();
    println!("Environment:");
    println!("  {}  path to a JSON ValidationConfig", CONFIG_ENV);
    println!("  {}   path to a JSON array of bank records", BANKS_ENV);
}

fn load_config() -> Result<ValidationConfig> {
    match env::var(CONFIG_ENV) {
        Ok(path) => ValidationConfig::from_file(&path),
        Err(_) => Ok(ValidationConfig::default()),
    }
}

fn load_registry() -> Result<BankRegistry> {
    match env::var(BANKS_ENV) {
        Ok(path) => BankRegistry::from_file(&path),
        Err(_) => Ok(BankRegistry::new()),
    }
}

fn build_service() -> Result<Arc<AccountValidationService>> {
    let config = load_config()?;
    let registry = load_registry()?;
    let lookup = MockHolderLookup::new(config.lookup_delay());

    Ok(Arc::new(AccountValidationService::new(
        Arc::new(registry),
        Arc::new(lookup),
        config,
    )))
}

async fn run_validate(input: &str, swift: Option<&str>) -> Result<()> {
    println!("🔍 Validating account input");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let service = build_service()?;
    let classified = service.classify(input);
    println!("  Input:      {}", input);
    println!("  Classified: {}", classified.kind.as_str());

    let result = service
        .validate(&classified, swift)
        .await
        .context("account holder lookup failed")?;

    if result.is_valid {
        if classified.is_iban() {
            println!("  IBAN:       {}", format_iban(&classified.normalized));
        }
        if let Some(bank) = &result.bank_details {
            println!("  Bank:       {} ({})", bank.name, bank.swift_code);
            println!("  Branch:     {}", bank.sample_branch);
        }
        if let Some(title) = &result.account_title {
            println!("  Holder:     {}", title);
        }
        if let Some(confidence) = result.confidence {
            println!("  Confidence: {}%", confidence);
        }
        println!("\n✅ Valid");
    } else if let Some(kind) = result.error {
        println!("\n❌ {} ({})", kind.as_str(), kind.message_key());
    }

    Ok(())
}

fn run_banks() -> Result<()> {
    let registry = load_registry()?;

    println!("🏦 Supported banks ({})", registry.count());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for bank in registry.all_banks() {
        println!(
            "  {}  {:<10} {:<28} {}",
            bank.local_bank_code, bank.swift_code, bank.name, bank.sample_branch
        );
    }

    Ok(())
}

/// Scripted add-beneficiary flow against the in-memory collaborators
async fn run_demo(language: &str) -> Result<()> {
    println!("🧭 Add beneficiary - scripted walkthrough");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let service = build_service()?;
    let store = InMemoryBeneficiaryStore::new();
    let navigator = RecordingNavigator::new();

    let mut wizard = BeneficiaryWizard::new(
        service,
        Arc::new(store.clone()),
        Arc::new(navigator.clone()),
        Arc::new(StaticLocalizer::for_language(language)),
    );

    // 1. Local account number without a bank → bank picker
    wizard.set_account_input("9876543210")?;
    let step = wizard.advance().await?;
    print_step(&wizard, step);

    // 2. Forgot to pick a bank → inline error, same step
    if let Err(e) = wizard.advance().await {
        println!("  ⚠️  {}", wizard.inline_message(&e));
    }

    // 3. Pick ADCB and continue
    wizard.select_bank("ADCBAEAA")?;
    let step = wizard.advance().await?;
    print_step(&wizard, step);
    if let Some(title) = &wizard.validation().account_title {
        println!("  Holder: {}", title);
    }

    // 4. Personal details
    wizard.set_nickname(Some("Demo"))?;
    wizard.set_relationship(Some(Relationship::Friend))?;
    wizard.set_purpose(Some(TransferPurpose::Rent))?;
    let step = wizard.advance().await?;
    print_step(&wizard, step);

    // 5. Save and go to amount entry
    let step = wizard.save_and_pay().await?;
    print_step(&wizard, step);

    if let Some(saved) = wizard.saved_beneficiary() {
        println!(
            "\n✅ Saved {} ({} at {})",
            saved.name,
            saved.masked_account(),
            saved.bank
        );
    }
    for (screen, _) in navigator.calls() {
        println!("  → {}", screen.id());
    }
    println!("  Store holds {} beneficiary(ies)", store.count());

    Ok(())
}

fn print_step(wizard: &BeneficiaryWizard, step: WizardStep) {
    println!("\n▶ {} [{:?}]", wizard.step_title(), step);
}
