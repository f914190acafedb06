use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Glass,
    Plastic,
    Paper,
    Unknown,
}

impl Topic {
    pub fn advice(self) -> &'static str {
        match self {
            Topic::Glass => "♻️ Consejo: Lava y quita tapas. Puedes llevar vidrio a los puntos fijos marcados en el mapa.",
            Topic::Plastic => "♻️ Consejo: Aplasta botellas PET para ahorrar espacio y retira tapas si corresponde.",
            Topic::Paper => "♻️ Consejo: Mantén el papel seco y plegado; lleva a puntos que acepten papel y cartón.",
            Topic::Unknown => "GreenBot está aprendiendo. Si necesitas información específica, selecciona filtros y revisa la lista de puntos.",
        }
    }
}

// Checked in order; the first trigger found wins.
const TRIGGERS: &[(&[&str], Topic)] = &[
    (&["vidrio"], Topic::Glass),
    (&["plástico", "pet"], Topic::Plastic),
    (&["papel", "cartón"], Topic::Paper),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub topic: Topic,
    pub text: &'static str,
}

pub fn respond(text: &str) -> Reply {
    let lowered = text.to_lowercase();
    let topic = TRIGGERS
        .iter()
        .find(|(terms, _)| terms.iter().any(|t| lowered.contains(t)))
        .map(|&(_, topic)| topic)
        .unwrap_or(Topic::Unknown);
    Reply { topic, text: topic.advice() }
}
