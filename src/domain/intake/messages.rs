//! User-facing message templates for the intake conversation.
//!
//! All copy is Spanish, the language of the lab's patients. Keeping
//! every template here lets the workflow handlers stay free of
//! presentation strings.

use super::{Cart, IdentifiedPatient, PatientRecord};
use crate::domain::catalog::MatchCandidate;
use crate::domain::foundation::{Price, QuoteId};

/// Lab contact details appended to every hand-off message.
pub const LAB_CONTACT: &str =
    "Laboratorio Clínico Central — Tel: 0212-555-0199, atencion@labcentral.example";

/// Opening message of the intake workflow.
pub fn greeting() -> String {
    "¡Hola! Soy el asistente del laboratorio. Te ayudaré a preparar un presupuesto.\n\
     Por favor indícame tu número de cédula o documento de identidad."
        .to_string()
}

pub fn invalid_document_id() -> String {
    "No reconozco ese documento. Escríbelo como aparece en tu cédula, por ejemplo: V-17371453."
        .to_string()
}

/// Enumerated list for ambiguous identity lookups.
pub fn patient_choices(candidates: &[PatientRecord]) -> (String, Vec<String>) {
    let text = "Encontré varios registros con ese documento. Responde con el número que te corresponde:"
        .to_string();
    let options = candidates
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}. {} ({})", i + 1, p.full_name(), p.document_id))
        .collect();
    (text, options)
}

pub fn invalid_patient_selection(max: usize) -> String {
    format!("Respuesta no válida. Escribe un número entre 1 y {}.", max)
}

pub fn ask_surname() -> String {
    "Para proteger tus datos necesito verificar tu identidad.\n¿Cuál es tu apellido?".to_string()
}

pub fn surname_retry(remaining: u8) -> String {
    format!(
        "El apellido no coincide con nuestros registros. Te quedan {} intento(s).",
        remaining
    )
}

pub fn ask_birth_month() -> String {
    "Perfecto. ¿En qué mes naciste? Puedes escribir el número o el nombre del mes.".to_string()
}

pub fn birth_month_retry(remaining: u8) -> String {
    format!(
        "El mes no coincide con nuestros registros. Te quedan {} intento(s).",
        remaining
    )
}

/// Verification lockout after exhausting the attempt budget.
pub fn verification_lockout() -> String {
    format!(
        "Por seguridad no puedo continuar con esta conversación.\n\
         Por favor comunícate directamente con nosotros: {}",
        LAB_CONTACT
    )
}

pub fn verified(patient: &IdentifiedPatient) -> String {
    format!(
        "¡Gracias, {}! Identidad verificada.\n\
         ¿Qué estudios deseas cotizar? Puedes escribir varios separados por comas.",
        patient.first_name
    )
}

pub fn unknown_id_start_registration() -> String {
    "No encontré ese documento en nuestros registros, así que te registraré como paciente nuevo.\n\
     ¿Cuál es tu nombre?"
        .to_string()
}

pub fn invalid_name() -> String {
    "¿Me repites el nombre, por favor?".to_string()
}

pub fn ask_last_name() -> String {
    "¿Y tu apellido?".to_string()
}

pub fn ask_birth_date() -> String {
    "¿Cuál es tu fecha de nacimiento? Formato DD/MM/AAAA, por ejemplo 14/02/1985.".to_string()
}

pub fn invalid_birth_date() -> String {
    "Esa fecha no es válida. Usa el formato DD/MM/AAAA, por ejemplo 14/02/1985.".to_string()
}

pub fn ask_sex() -> String {
    "¿Sexo? Responde M o F.".to_string()
}

pub fn invalid_sex() -> String {
    "Responde M (masculino) o F (femenino), por favor.".to_string()
}

pub fn ask_phone() -> String {
    "¿Número de teléfono de contacto? Incluye el código de área.".to_string()
}

pub fn invalid_phone() -> String {
    "Ese teléfono parece incompleto; necesito al menos 10 dígitos.".to_string()
}

pub fn ask_email() -> String {
    "Por último, ¿correo electrónico? Si no tienes, responde \"no\".".to_string()
}

pub fn invalid_email() -> String {
    "Ese correo no parece válido. Escríbelo de nuevo o responde \"no\".".to_string()
}

pub fn registered(patient: &IdentifiedPatient) -> String {
    format!(
        "¡Listo, {}! Quedaste registrado.\n\
         ¿Qué estudios deseas cotizar? Puedes escribir varios separados por comas.",
        patient.first_name
    )
}

pub fn no_results() -> String {
    "No encontré estudios con ese nombre. Intenta con otro término, por ejemplo \"hemograma\"."
        .to_string()
}

/// Low-confidence "did you mean" suggestions.
pub fn suggestions(candidates: &[&MatchCandidate]) -> String {
    let mut text = String::from("No encontré coincidencias exactas. ¿Quizás buscabas alguno de estos?\n");
    for c in candidates {
        text.push_str(&format!("• {} ({})\n", c.entry.display_name, c.entry.price));
    }
    text.push_str("Escribe el nombre del estudio tal como aparece.");
    text
}

pub fn added_to_cart(names: &[String], cart: &Cart) -> String {
    let added = names.join(", ");
    format!(
        "Agregué: {}.\n\
         Llevas {} estudio(s) por un subtotal de {}.\n\
         Puedes buscar más estudios o escribir \"listo\" para ver tu presupuesto.",
        added,
        cart.len(),
        cart.total()
    )
}

/// Enumerated list for ambiguous study searches.
pub fn study_choices(candidates: &[MatchCandidate]) -> (String, Vec<String>) {
    let text = "Encontré varios estudios que coinciden. Responde con el número del que buscas, o \"todos\" para agregarlos todos:"
        .to_string();
    let options = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {} ({})", i + 1, c.entry.display_name, c.entry.price))
        .collect();
    (text, options)
}

pub fn invalid_study_selection(max: usize) -> String {
    format!(
        "Respuesta no válida. Escribe un número entre 1 y {}, o \"todos\".",
        max
    )
}

pub fn already_in_cart(names: &[String]) -> String {
    format!(
        "{} ya está en tu presupuesto. Puedes buscar otro estudio o escribir \"listo\".",
        names.join(", ")
    )
}

pub fn empty_cart() -> String {
    "Aún no has agregado ningún estudio. Dime qué estudios deseas cotizar.".to_string()
}

/// Cart summary presented before the final confirmation.
pub fn cart_summary(patient: &IdentifiedPatient, cart: &Cart) -> String {
    let mut text = format!("Presupuesto para {}:\n", patient.full_name());
    for entry in cart.items() {
        text.push_str(&format!("• {} — {}\n", entry.display_name, entry.price));
    }
    text.push_str(&format!(
        "Total: {}\n¿Confirmas el presupuesto? (sí/no)",
        cart.total()
    ));
    text
}

pub fn confirm_reprompt() -> String {
    "Responde \"sí\" para confirmar el presupuesto o \"no\" para cancelarlo.".to_string()
}

pub fn quote_committed(quote_id: &QuoteId, total: Price) -> String {
    format!(
        "¡Presupuesto confirmado! Referencia: {}.\n\
         Total: {}. Preséntalo en caja al llegar al laboratorio. ¡Te esperamos!",
        quote_id, total
    )
}

pub fn cancelled() -> String {
    "Conversación cancelada. Escríbeme cuando quieras retomar tu presupuesto.".to_string()
}

/// Fixed hand-off for collaborator failures.
pub fn handoff() -> String {
    format!(
        "Lo siento, en este momento no puedo completar tu solicitud.\n\
         Por favor comunícate directamente con nosotros: {}",
        LAB_CONTACT
    )
}
