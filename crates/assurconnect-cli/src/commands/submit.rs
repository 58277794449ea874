use crate::commands::{print_json, Context};
use crate::notify::notify_new_lead;
use anyhow::Result;
use assurconnect_core::{
    AutoQuote, ContactDetails, HealthQuote, HomeQuote, PetQuote, ProLiabilityQuote,
};
use assurconnect_store::Appended;
use clap::{Args, Subcommand};
use tracing::warn;

#[derive(Debug, Subcommand)]
pub enum SubmitCommand {
    /// Car insurance quote
    Auto(AutoArgs),
    /// Home insurance quote
    Home(HomeArgs),
    /// Health insurance quote
    Health(HealthArgs),
    /// Pet insurance quote
    Pet(PetArgs),
    /// Professional liability quote
    #[command(name = "rc-pro", alias = "professional-liability")]
    RcPro(ProLiabilityArgs),
}

#[derive(Debug, Args)]
pub struct ContactArgs {
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
}

impl From<ContactArgs> for ContactDetails {
    fn from(args: ContactArgs) -> Self {
        Self {
            last_name: args.last_name,
            first_name: args.first_name,
            email: args.email,
            phone: args.phone,
        }
    }
}

#[derive(Debug, Args)]
pub struct AutoArgs {
    #[command(flatten)]
    pub contact: ContactArgs,
    #[arg(long)]
    pub zip_code: String,
    #[arg(long)]
    pub birth_date: String,
    #[arg(long)]
    pub vehicle_type: String,
    #[arg(long)]
    pub license_date: String,
    #[arg(long)]
    pub bonus_malus: String,
    #[arg(long)]
    pub situation: String,
    /// Agree to be contacted about this request
    #[arg(long)]
    pub consent: bool,
}

#[derive(Debug, Args)]
pub struct HomeArgs {
    #[command(flatten)]
    pub contact: ContactArgs,
    #[arg(long)]
    pub zip_code: String,
    #[arg(long)]
    pub housing_type: String,
    #[arg(long)]
    pub surface: String,
    /// Tenant or owner
    #[arg(long)]
    pub status: String,
    /// Agree to be contacted about this request
    #[arg(long)]
    pub consent: bool,
}

#[derive(Debug, Args)]
pub struct HealthArgs {
    #[command(flatten)]
    pub contact: ContactArgs,
    #[arg(long)]
    pub zip_code: String,
    #[arg(long)]
    pub birth_date: String,
    #[arg(long)]
    pub regime: String,
    #[arg(long)]
    pub coverage_level: String,
    #[arg(long)]
    pub beneficiaries: Option<String>,
    /// Agree to be contacted about this request
    #[arg(long)]
    pub consent: bool,
}

#[derive(Debug, Args)]
pub struct PetArgs {
    #[command(flatten)]
    pub contact: ContactArgs,
    #[arg(long)]
    pub zip_code: String,
    #[arg(long)]
    pub animal_type: String,
    #[arg(long)]
    pub breed: String,
    #[arg(long)]
    pub age: String,
    #[arg(long)]
    pub medical_history: Option<String>,
    /// Agree to be contacted about this request
    #[arg(long)]
    pub consent: bool,
}

#[derive(Debug, Args)]
pub struct ProLiabilityArgs {
    #[command(flatten)]
    pub contact: ContactArgs,
    #[arg(long)]
    pub company_name: String,
    #[arg(long)]
    pub activity: String,
    #[arg(long)]
    pub turnover: String,
    #[arg(long)]
    pub workforce: String,
    /// Agree to be contacted about this request
    #[arg(long)]
    pub consent: bool,
}

pub fn submit(ctx: &Context<'_>, cmd: SubmitCommand) -> Result<()> {
    let appended = match cmd {
        SubmitCommand::Auto(args) => ctx.store.append_form(&AutoQuote {
            contact: args.contact.into(),
            zip_code: args.zip_code,
            birth_date: args.birth_date,
            vehicle_type: args.vehicle_type,
            license_date: args.license_date,
            bonus_malus: args.bonus_malus,
            situation: args.situation,
            consent: args.consent,
        })?,
        SubmitCommand::Home(args) => ctx.store.append_form(&HomeQuote {
            contact: args.contact.into(),
            zip_code: args.zip_code,
            housing_type: args.housing_type,
            surface: args.surface,
            status: args.status,
            consent: args.consent,
        })?,
        SubmitCommand::Health(args) => ctx.store.append_form(&HealthQuote {
            contact: args.contact.into(),
            zip_code: args.zip_code,
            birth_date: args.birth_date,
            regime: args.regime,
            coverage_level: args.coverage_level,
            beneficiaries: args.beneficiaries,
            consent: args.consent,
        })?,
        SubmitCommand::Pet(args) => ctx.store.append_form(&PetQuote {
            contact: args.contact.into(),
            zip_code: args.zip_code,
            animal_type: args.animal_type,
            breed: args.breed,
            age: args.age,
            medical_history: args.medical_history,
            consent: args.consent,
        })?,
        SubmitCommand::RcPro(args) => ctx.store.append_form(&ProLiabilityQuote {
            contact: args.contact.into(),
            company_name: args.company_name,
            activity: args.activity,
            turnover: args.turnover,
            workforce: args.workforce,
            consent: args.consent,
        })?,
    };
    confirm(ctx, appended)
}

fn confirm(ctx: &Context<'_>, appended: Appended) -> Result<()> {
    let Appended {
        lead,
        persist_error,
    } = appended;

    if let Some(err) = persist_error {
        eprintln!("warning: lead {} was not saved locally: {}", lead.id, err);
    }

    if let Some(notifier) = ctx.notifier {
        if let Err(err) = notify_new_lead(notifier, &lead) {
            warn!(id = %lead.id, error = %err, "new lead notification failed");
        }
    }

    if ctx.json {
        return print_json(&lead);
    }

    println!(
        "Thank you {}, your {} quote request has been recorded.",
        lead.first_name().unwrap_or("there"),
        lead.category.label().to_lowercase()
    );
    println!("reference: {}", lead.id);
    Ok(())
}
