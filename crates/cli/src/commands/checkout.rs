//! Checkout commands.

use chrono::Utc;
use clap::{Args, Subcommand};
use comanda_client::{CheckoutError, SessionError};
use comanda_core::checkout::wizard::STEP_COUNT;
use comanda_core::checkout::{CheckoutForm, Wizard, WizardError};
use comanda_core::types::{DeliveryMethod, PaymentMethod, ReceiptType};
use comanda_core::validation::{self, Field};

use super::{CliError, Context, print, prompt};
use crate::render;

/// Prompt rounds per step before giving up in interactive mode.
const MAX_PROMPT_ROUNDS: usize = 3;

#[derive(Subcommand)]
pub enum CheckoutAction {
    /// Show the delivery, payment and receipt options
    Options,
    /// Show the cart totals for a delivery method
    Totals {
        #[arg(short, long, default_value = "recoger")]
        delivery: DeliveryMethod,
    },
    /// Place the order for the current cart
    Submit(SubmitArgs),
}

/// Checkout form fields. Blank customer fields are filled from the profile.
#[derive(Args)]
pub struct SubmitArgs {
    /// Prompt for missing or invalid fields
    #[arg(short, long)]
    interactive: bool,

    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,

    /// `boleta` or `factura`
    #[arg(long, default_value = "boleta")]
    receipt: ReceiptType,
    #[arg(long)]
    dni: Option<String>,
    #[arg(long)]
    ruc: Option<String>,

    /// `delivery` or `recoger`
    #[arg(long, default_value = "recoger")]
    delivery: DeliveryMethod,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    reference: Option<String>,

    /// `tarjeta` or `yape`
    #[arg(long, default_value = "tarjeta")]
    payment: PaymentMethod,
    #[arg(long)]
    card_number: Option<String>,
    /// Card expiry as MM/YY
    #[arg(long)]
    expiry: Option<String>,
    #[arg(long)]
    card_holder: Option<String>,
    #[arg(long)]
    cvv: Option<String>,
    #[arg(long)]
    yape_phone: Option<String>,
    #[arg(long)]
    yape_code: Option<String>,
}

impl SubmitArgs {
    fn form(self) -> CheckoutForm {
        CheckoutForm {
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            receipt_type: self.receipt,
            dni: self.dni.unwrap_or_default(),
            ruc: self.ruc.unwrap_or_default(),
            delivery_method: self.delivery,
            address: self.address.unwrap_or_default(),
            reference: self.reference.unwrap_or_default(),
            payment_method: self.payment,
            card_number: tidy(Field::CardNumber, self.card_number.unwrap_or_default()),
            expiry: tidy(Field::Expiry, self.expiry.unwrap_or_default()),
            card_holder: self.card_holder.unwrap_or_default(),
            cvv: self.cvv.unwrap_or_default(),
            yape_phone: self.yape_phone.unwrap_or_default(),
            yape_code: self.yape_code.unwrap_or_default(),
        }
    }
}

/// Group card digits and add the expiry slash. Input with the wrong digit
/// count is left alone for the validator to report.
fn tidy(field: Field, raw: String) -> String {
    match field {
        Field::CardNumber if validation::digits_only(&raw, 17).len() == 16 => {
            validation::format_card_number(&raw)
        }
        Field::Expiry if !raw.contains('/') => validation::format_expiry(&raw),
        _ => raw,
    }
}

pub async fn run(ctx: &Context, action: CheckoutAction) -> Result<(), CliError> {
    let checkout = ctx.checkout();

    match action {
        CheckoutAction::Options => {
            let lookups = checkout.lookups().await;
            print(&render::lookups(&lookups))
        }
        CheckoutAction::Totals { delivery } => {
            let form = CheckoutForm {
                delivery_method: delivery,
                ..CheckoutForm::default()
            };
            print(&render::totals(&checkout.totals(&form)?))
        }
        CheckoutAction::Submit(args) => {
            let interactive = args.interactive;
            let mut form = args.form();

            match ctx.session().prefill_checkout(&mut form).await {
                Ok(_) => {}
                Err(SessionError::NotLoggedIn) => return Err(CheckoutError::NotLoggedIn.into()),
                Err(e) => return Err(e.into()),
            }

            let mut wizard = Wizard::new();
            for _ in 0..STEP_COUNT {
                advance(&mut wizard, &mut form, interactive)?;
            }
            tracing::debug!(progress = %render::progress(&wizard.progress()), "Checkout form complete");

            let order = checkout.submit(&mut wizard, &form).await?;
            print(&render::confirmation(&order, Utc::now()))
        }
    }
}

/// Validate the current step and move forward, prompting for bad fields
/// in interactive mode.
fn advance(wizard: &mut Wizard, form: &mut CheckoutForm, interactive: bool) -> Result<(), CliError> {
    let mut rounds = 0;
    loop {
        match wizard.next(form) {
            Ok(_) => return Ok(()),
            Err(err @ WizardError::Incomplete { .. }) if interactive && rounds < MAX_PROMPT_ROUNDS => {
                rounds += 1;
                let step = wizard.step();
                for failure in err.failures() {
                    let question = format!(
                        "[{}] {} ({}): ",
                        step.title(),
                        failure.field.label(),
                        failure.failure
                    );
                    let answer = tidy(failure.field, prompt(&question)?);
                    if let Some(slot) = form.value_mut(failure.field) {
                        *slot = answer;
                    }
                }
            }
            Err(err) => {
                return Err(CliError::Input(format!(
                    "{} ({})\n{}",
                    err,
                    wizard.step().title(),
                    render::failures(err.failures()).trim_end()
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tidy_card_fields() {
        assert_eq!(
            tidy(Field::CardNumber, "4111111111111111".to_string()),
            "4111 1111 1111 1111"
        );
        assert_eq!(
            tidy(Field::CardNumber, "41111111111111112".to_string()),
            "41111111111111112"
        );
        assert_eq!(tidy(Field::Expiry, "0727".to_string()), "07/27");
        assert_eq!(tidy(Field::Expiry, "07/27".to_string()), "07/27");
        assert_eq!(tidy(Field::Cvv, " 123 ".to_string()), " 123 ");
    }
}
