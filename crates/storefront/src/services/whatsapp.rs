//! Pre-filled WhatsApp deep links.

use core::fmt::Write as _;

use aprova_facil_core::OrderId;

/// Builds `https://wa.me/<number>?text=<message>` links for one number.
#[derive(Debug, Clone)]
pub struct WhatsApp {
    number: String,
}

impl WhatsApp {
    #[must_use]
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
        }
    }

    /// Link that opens a chat with `text` already typed.
    #[must_use]
    pub fn link(&self, text: &str) -> String {
        format!(
            "https://wa.me/{}?text={}",
            self.number,
            urlencoding::encode(text)
        )
    }

    /// Link for the floating button shown on every page.
    #[must_use]
    pub fn default_link(&self) -> String {
        self.link("Olá, quero simular meu crédito com o Aprova Fácil.")
    }

    /// Link offered after a successful payment.
    #[must_use]
    pub fn order_link(&self, product_name: &str, order_id: OrderId) -> String {
        self.link(&format!(
            "Olá! Acabei de contratar o serviço {product_name}. Pedido #{order_id}. Gostaria de saber os próximos passos."
        ))
    }

    /// Link asking about a plan from the pricing section.
    #[must_use]
    pub fn plan_link(&self, product_name: &str) -> String {
        self.link(&format!("Olá! Tenho interesse no plano {product_name}."))
    }

    /// Link carrying a labelled form submission.
    #[must_use]
    pub fn form_link(&self, heading: &str, fields: &[(&str, &str)]) -> String {
        let mut text = format!("{heading}\n\n");
        for (i, (label, value)) in fields.iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            let _ = write!(text, "{label}: {}", value.trim());
        }
        self.link(&text)
    }
}
