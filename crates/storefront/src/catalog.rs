//! Service plan catalog.
//!
//! The storefront ships with the four plans it sells. When the backend
//! exposes a product with the same slug, its prices and id take precedence.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::instrument;

use aprova_facil_core::Product;

use crate::backend::{BackendClient, ProductResponse};

/// Slug of the plan highlighted on the landing page.
pub const FEATURED_SLUG: &str = "limpa-nome";

struct Plan {
    slug: &'static str,
    name: &'static str,
    description: &'static str,
    deliverables: &'static [&'static str],
    deadline: &'static str,
    deadline_note: Option<&'static str>,
    payment_terms: &'static str,
    price_pf: i64,
    price_pj: i64,
}

const PLANS: &[Plan] = &[
    Plan {
        slug: "limpa-nome",
        name: "LIMPA NOME",
        description: "Remove apontamentos nos órgãos SERASA, SPC, SCPC, BOA VISTA e CENPROT através de ação jurídica coletiva.",
        deliverables: &[
            "Exclusão de apontamentos",
            "Regularização documental",
            "Relatório oficial 'Nada Consta'",
            "Suporte ativo",
            "Garantia de 6 meses",
        ],
        deadline: "30 a 60 dias úteis",
        deadline_note: Some("80% dos casos entregues antes de 40 dias"),
        payment_terms: "Entrada de R$ 750,00",
        price_pf: 1500,
        price_pj: 1800,
    },
    Plan {
        slug: "rating-raind",
        name: "RATING / RAIND",
        description: "Atualiza o rating bancário (classificação A a E), restaura Score e renda presumida, melhorando a análise interna dos bancos.",
        deliverables: &[
            "Atualização de rating bancário",
            "Atualização de renda presumida",
            "Restauração da capacidade de pagamento",
            "Correção de inconsistências internas",
        ],
        deadline: "30 dias úteis",
        deadline_note: None,
        payment_terms: "À vista ou 50% + 50%",
        price_pf: 2500,
        price_pj: 3000,
    },
    Plan {
        slug: "score",
        name: "SCORE",
        description: "Serviço especializado para recuperação e aumento do Score de crédito junto aos birôs de proteção ao crédito.",
        deliverables: &[
            "Análise do perfil de crédito",
            "Estratégias de recuperação",
            "Acompanhamento da evolução",
            "Relatório de progresso",
        ],
        deadline: "Consultar",
        deadline_note: None,
        payment_terms: "Consultar condições",
        price_pf: 800,
        price_pj: 1000,
    },
    Plan {
        slug: "escavador-jusbrasil",
        name: "ESCAVADOR / JUSBRASIL",
        description: "Limpa apontamentos no Google/Escavador e realiza levantamento completo de ações judiciais.",
        deliverables: &[
            "Retirada de apontamentos do Google/Escavador",
            "Limpeza de informações constrangedoras",
            "Mapeamento jurídico completo",
            "Relatório técnico para bancos",
        ],
        deadline: "15 a 30 dias úteis",
        deadline_note: None,
        payment_terms: "Consultar condições",
        price_pf: 1250,
        price_pj: 1500,
    },
];

impl Plan {
    fn to_product(&self) -> Product {
        Product {
            slug: self.slug.to_owned(),
            name: self.name.to_owned(),
            description: self.description.to_owned(),
            deliverables: self.deliverables.iter().map(|d| (*d).to_owned()).collect(),
            deadline: self.deadline.to_owned(),
            deadline_note: self.deadline_note.map(str::to_owned),
            payment_terms: self.payment_terms.to_owned(),
            price_pf: Decimal::from(self.price_pf),
            price_pj: Decimal::from(self.price_pj),
            backend_id: None,
        }
    }
}

/// The built-in plans, without backend data.
#[must_use]
pub fn builtin() -> Vec<Product> {
    PLANS.iter().map(Plan::to_product).collect()
}

/// Overlay active backend products onto the built-in plans by slug.
#[must_use]
pub fn overlay(mut products: Vec<Product>, backend: &[ProductResponse]) -> Vec<Product> {
    for product in &mut products {
        if let Some(remote) = backend
            .iter()
            .find(|r| r.is_active && r.slug == product.slug)
        {
            product.price_pf = remote.price_pf;
            product.price_pj = remote.price_pj;
            product.backend_id = Some(remote.id);
        }
    }
    products
}

/// Catalog backed by the built-in plans and the backend product listing.
#[derive(Clone)]
pub struct Catalog {
    backend: BackendClient,
    builtin: Arc<Vec<Product>>,
}

impl Catalog {
    #[must_use]
    pub fn new(backend: BackendClient) -> Self {
        Self {
            backend,
            builtin: Arc::new(builtin()),
        }
    }

    /// All plans, with backend prices when the backend is reachable.
    ///
    /// A backend failure is logged and the built-in prices are used.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Vec<Product> {
        match self.backend.products().await {
            Ok(remote) => overlay(self.builtin.as_ref().clone(), &remote),
            Err(e) => {
                tracing::warn!(error = %e, "Backend catalog unavailable, using built-in prices");
                self.builtin.as_ref().clone()
            }
        }
    }

    /// Find a plan by slug.
    pub async fn product(&self, slug: &str) -> Option<Product> {
        self.products().await.into_iter().find(|p| p.slug == slug)
    }
}
