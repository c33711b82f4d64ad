//! Static marketing copy for the landing and content pages.

/// A headline number on the landing page.
#[derive(Debug, Clone, Copy)]
pub struct Stat {
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Highlight {
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Testimonial {
    pub name: &'static str,
    pub location: &'static str,
    pub text: &'static str,
}

impl Testimonial {
    /// Initials for the avatar bubble.
    #[must_use]
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .collect()
    }
}

/// A service line on the services page.
#[derive(Debug, Clone, Copy)]
pub struct ServiceLine {
    pub title: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
}

pub const TRUST_BADGES: &[Highlight] = &[
    Highlight {
        title: "100% Seguro",
        description: "Dados criptografados",
    },
    Highlight {
        title: "Sigilo Total",
        description: "Informações protegidas",
    },
    Highlight {
        title: "98% de Sucesso",
        description: "Casos resolvidos",
    },
];

pub const STATS: &[Stat] = &[
    Stat {
        value: "5.000+",
        label: "Clientes Atendidos",
        description: "Pessoas que recuperaram o crédito",
    },
    Stat {
        value: "98%",
        label: "Taxa de Sucesso",
        description: "Casos resolvidos com êxito",
    },
    Stat {
        value: "30 dias",
        label: "Prazo Médio",
        description: "Para limpeza do nome",
    },
    Stat {
        value: "150+",
        label: "Pontos no Score",
        description: "Aumento médio após o serviço",
    },
];

pub const SERVICES: &[Highlight] = &[
    Highlight {
        title: "Retirada de Restrições",
        description: "Removemos seu nome do Serasa, SPC e demais órgãos de proteção ao crédito de forma rápida e eficiente.",
    },
    Highlight {
        title: "Negociação de Débitos",
        description: "Negociamos suas dívidas com bancos e financeiras para conseguir as melhores condições de pagamento.",
    },
    Highlight {
        title: "Regularização Bacen",
        description: "Regularizamos sua situação junto ao Banco Central, garantindo acesso completo aos serviços bancários.",
    },
    Highlight {
        title: "Parcelamentos Especiais",
        description: "Criamos acordos personalizados com parcelas que cabem no seu bolso, sem comprometer sua renda.",
    },
    Highlight {
        title: "Cancelamento de Protestos",
        description: "Eliminamos protestos em cartório que estejam prejudicando seu nome e sua reputação financeira.",
    },
    Highlight {
        title: "Aumento de Score",
        description: "Trabalhamos para recuperar e aumentar seu score de crédito, abrindo portas para novas oportunidades.",
    },
];

/// What every plan includes, shown next to the plan cards.
pub const PLAN_FEATURES: &[&str] = &[
    "Suporte completo até a finalização",
    "Atendimento personalizado",
    "Acompanhamento diário do processo",
    "Envio de relatórios semanais",
    "Negociação com todos os credores",
    "Regularização completa do CPF",
    "Consultoria financeira gratuita",
    "Garantia de satisfação",
];

pub const TESTIMONIALS: &[Testimonial] = &[
    Testimonial {
        name: "Maria Silva",
        location: "São Paulo, SP",
        text: "Estava com o nome sujo há 3 anos e em menos de 30 dias consegui limpar tudo! Agora já consegui até um cartão de crédito novo. Recomendo demais!",
    },
    Testimonial {
        name: "João Santos",
        location: "Rio de Janeiro, RJ",
        text: "Excelente atendimento! A equipe foi muito atenciosa e me manteve informado durante todo o processo. Meu score subiu mais de 200 pontos.",
    },
    Testimonial {
        name: "Ana Oliveira",
        location: "Belo Horizonte, MG",
        text: "Tinha dívidas em vários lugares e achava que nunca conseguiria resolver. O Limpa Nome negociou tudo e hoje estou livre! Obrigada!",
    },
    Testimonial {
        name: "Carlos Ferreira",
        location: "Curitiba, PR",
        text: "Profissionais de confiança! Cumpriram tudo que prometeram e no prazo combinado. Agora consigo financiar meu carro novo.",
    },
    Testimonial {
        name: "Lucia Mendes",
        location: "Salvador, BA",
        text: "O melhor investimento que já fiz! Em pouco tempo consegui regularizar minha situação e voltar a ter crédito no mercado.",
    },
    Testimonial {
        name: "Roberto Lima",
        location: "Fortaleza, CE",
        text: "Atendimento humanizado e resultado garantido. A equipe realmente se preocupa com o cliente. Super recomendo!",
    },
];

/// Credit bureaus shown in the partners strip.
pub const PARTNERS: &[&str] = &["SERASA", "SPC", "BOA VISTA", "SCPC", "CENPROT", "BACEN"];

pub const VALUES: &[Highlight] = &[
    Highlight {
        title: "Transparência",
        description: "Clareza e honestidade em cada etapa do processo de crédito.",
    },
    Highlight {
        title: "Empatia",
        description: "Entendemos cada história e tratamos cada cliente de forma única.",
    },
    Highlight {
        title: "Agilidade",
        description: "Processos otimizados para aprovação rápida e eficiente.",
    },
    Highlight {
        title: "Compromisso",
        description: "Dedicação total na conquista do seu sonho da casa própria.",
    },
];

pub const SERVICE_LINES: &[ServiceLine] = &[
    ServiceLine {
        title: "Financiamento Habitacional",
        description: "Realize o sonho da casa própria com as melhores condições do mercado. Atendemos compra de imóvel novo ou usado, com acompanhamento completo desde a análise de crédito até a assinatura do contrato.",
        features: &[
            "Taxa de juros competitiva",
            "Prazos de até 35 anos",
            "Entrada facilitada",
            "Uso de FGTS",
        ],
    },
    ServiceLine {
        title: "Terreno + Construção",
        description: "Transforme seu terreno em lar. Oferecemos consultoria completa para financiamento de compra de terreno e construção, com acompanhamento técnico e financeiro em todas as etapas do projeto.",
        features: &[
            "Análise de projeto",
            "Liberação por etapas",
            "Acompanhamento de obra",
            "Consultoria técnica",
        ],
    },
    ServiceLine {
        title: "Construção em Terreno Próprio",
        description: "Já tem o terreno? Financiamos a construção da sua casa dos sonhos. Avaliamos o projeto, orientamos sobre documentação e acompanhamos toda a execução da obra.",
        features: &[
            "Aprovação de projeto",
            "Cronograma financeiro",
            "Vistorias técnicas",
            "Liberação programada",
        ],
    },
    ServiceLine {
        title: "Minha Casa Minha Vida",
        description: "Acesso facilitado ao programa habitacional do governo federal. Verificamos seu enquadramento, orientamos sobre documentação necessária e conduzimos todo o processo de aprovação.",
        features: &[
            "Análise de elegibilidade",
            "Subsídios disponíveis",
            "Taxas reduzidas",
            "Processo simplificado",
        ],
    },
    ServiceLine {
        title: "Crédito Real Caixa",
        description: "Soluções de crédito personalizadas conforme sua renda e perfil financeiro. Diversas modalidades para atender diferentes necessidades e momentos da sua vida.",
        features: &[
            "Crédito personalizado",
            "Análise facilitada",
            "Múltiplas opções",
            "Taxas competitivas",
        ],
    },
    ServiceLine {
        title: "Seguros e Consórcios",
        description: "Proteção completa para você e sua família. Oferecemos seguros residenciais, de vida e consórcios para planejamento de longo prazo da aquisição do seu imóvel.",
        features: &[
            "Seguro residencial",
            "Seguro de vida",
            "Consórcio imobiliário",
            "Coberturas personalizadas",
        ],
    },
];

/// Public contact details shown in the footer and contact page.
pub mod contact {
    pub const PHONE: &str = "(11) 99999-9999";
    pub const EMAIL: &str = "contato@aprovafacil.com.br";
    pub const LOCATION: &str = "São Paulo, SP";
    pub const HOURS: &str = "Seg a Sex, 9h às 18h";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_testimonial_initials() {
        assert_eq!(
            TESTIMONIALS.first().map(Testimonial::initials).as_deref(),
            Some("MS")
        );
        let single = Testimonial {
            name: "Ana",
            location: "",
            text: "",
        };
        assert_eq!(single.initials(), "A");
    }
}
