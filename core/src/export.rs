//! Platform import files rendered from a `ScheduleArtifact`.
//!
//! The column sets and quoting here mirror the host platform's import
//! format exactly; nothing in this module decides scheduling — it only
//! lays the artifact's steps and event bindings into rows.

use crate::config::ScheduleConfig;
use crate::emitter::{deliver_field_name, ScheduleArtifact, StepKind};

/// Data dictionary column set, in order.
pub const DICTIONARY_HEADERS: [&str; 18] = [
    "Variable / Field Name",
    "Form Name",
    "Section Header",
    "Field Type",
    "Field Label",
    "Choices, Calculations, OR Slider Labels",
    "Field Note",
    "Text Validation Type OR Show Slider Number",
    "Text Validation Min",
    "Text Validation Max",
    "Identifier?",
    "Branching Logic (Show field only if...)",
    "Required Field?",
    "Custom Alignment",
    "Question Number (surveys only)",
    "Matrix Group Name",
    "Matrix Ranking?",
    "Field Annotation",
];

/// ASI definition column set, in order.
pub const ASI_HEADERS: [&str; 33] = [
    "form_name",
    "event_name",
    "condition_surveycomplete_form_name",
    "condition_surveycomplete_event_name",
    "num_recurrence",
    "units_recurrence",
    "max_recurrence",
    "active",
    "email_subject",
    "email_content",
    "email_sender",
    "email_sender_display",
    "condition_andor",
    "condition_logic",
    "condition_send_time_option",
    "condition_send_time_lag_days",
    "condition_send_time_lag_hours",
    "condition_send_time_lag_minutes",
    "condition_send_time_lag_field",
    "condition_send_time_lag_field_after",
    "condition_send_next_day_type",
    "condition_send_next_time",
    "condition_send_time_exact",
    "delivery_type",
    "reminder_type",
    "reminder_timelag_days",
    "reminder_timelag_hours",
    "reminder_timelag_minutes",
    "reminder_nextday_type",
    "reminder_nexttime",
    "reminder_exact_time",
    "reminder_num",
    "reeval_before_send",
];

fn quoted_row(cells: &[String]) -> String {
    cells
        .iter()
        .map(|cell| format!("\"{}\"", cell.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}

fn plain_row(cells: &[String]) -> String {
    cells.join(",")
}

fn dictionary_row(
    name: &str,
    form: &str,
    section: &str,
    field_type: &str,
    label: &str,
    calculation: &str,
    note: &str,
    validation: &str,
    required: &str,
    annotation: &str,
) -> String {
    let cells: [String; 18] = [
        name.into(),
        form.into(),
        section.into(),
        field_type.into(),
        label.into(),
        calculation.into(),
        note.into(),
        validation.into(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        required.into(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        annotation.into(),
    ];
    quoted_row(&cells)
}

/// The data dictionary: one row per emitted step, plus the record-id
/// field and the placeholder survey form the platform requires.
pub fn data_dictionary_csv(config: &ScheduleConfig, artifact: &ScheduleArtifact) -> String {
    let naming = &config.naming;
    let mut rows = vec![quoted_row(
        &DICTIONARY_HEADERS.map(String::from),
    )];

    rows.push(dictionary_row(
        "record_id",
        &naming.config_form,
        "",
        "text",
        "Record ID",
        "",
        "",
        "",
        "",
        "",
    ));

    // Section headers open each group of fields: first of a kind wins.
    let mut first_constant = true;
    let mut first_jitter = true;
    let mut first_rand = true;
    let mut first_deliver = true;

    for step in &artifact.steps {
        let row = match step.kind {
            StepKind::SeedInput => dictionary_row(
                &step.name,
                &step.form,
                "EMA Configuration",
                "text",
                &step.label,
                "",
                "Initial seed for random number generator",
                "integer",
                "",
                &step.annotation,
            ),
            StepKind::StartTimestamp => dictionary_row(
                &step.name,
                &step.form,
                "",
                "text",
                &step.label,
                "",
                "When EMA sampling begins",
                "datetime_seconds_ymd",
                "y",
                &step.annotation,
            ),
            StepKind::Constant => {
                let section = if first_constant { "PRNG Constants" } else { "" };
                first_constant = false;
                dictionary_row(
                    &step.name,
                    &step.form,
                    section,
                    "text",
                    &step.label,
                    "",
                    "",
                    "integer",
                    "",
                    &step.annotation,
                )
            }
            StepKind::SeedTransform => dictionary_row(
                &step.name,
                &step.form,
                "",
                "calc",
                &step.label,
                &step.expression,
                "",
                "",
                "",
                &step.annotation,
            ),
            StepKind::JitterDraw | StepKind::JitterOffset => {
                let section = if first_jitter { "Jitter" } else { "" };
                first_jitter = false;
                dictionary_row(
                    &step.name,
                    &step.form,
                    section,
                    "calc",
                    &step.label,
                    &step.expression,
                    "",
                    "",
                    "",
                    &step.annotation,
                )
            }
            StepKind::SampleDraw => {
                let section = if first_rand { "Random Numbers" } else { "" };
                first_rand = false;
                dictionary_row(
                    &step.name,
                    &step.form,
                    section,
                    "calc",
                    &step.label,
                    &step.expression,
                    "",
                    "",
                    "",
                    &step.annotation,
                )
            }
            StepKind::DeliveryTime => {
                let section = if first_deliver { "EMA Schedule" } else { "" };
                first_deliver = false;
                dictionary_row(
                    &step.name,
                    &step.form,
                    section,
                    "text",
                    &step.label,
                    "",
                    "",
                    "datetime_seconds_ymd",
                    "",
                    &step.annotation,
                )
            }
        };
        rows.push(row);
    }

    rows.push(dictionary_row(
        &format!("{}_placeholder", naming.survey_form),
        &naming.survey_form,
        "",
        "descriptive",
        "<div class=\"rich-text-field-label\"><p>Add your EMA survey questions here.</p></div>",
        "",
        "",
        "",
        "",
        "",
    ));

    rows.join("\n")
}

/// The event list: the enrollment event plus one event per distinct
/// (day, window) pair.
pub fn events_csv(config: &ScheduleConfig, artifact: &ScheduleArtifact) -> String {
    let naming = &config.naming;
    let arm = naming.arm_num;
    let mut rows = vec![plain_row(&[
        "event_name".into(),
        "arm_num".into(),
        "unique_event_name".into(),
        "custom_event_label".into(),
    ])];
    rows.push(plain_row(&[
        naming.enrollment_event.clone(),
        arm.to_string(),
        naming.enrollment_event_unique(),
        String::new(),
    ]));
    for binding in &artifact.events {
        rows.push(plain_row(&[
            binding.event_name.clone(),
            arm.to_string(),
            format!("{}_arm_{arm}", binding.event_name),
            String::new(),
        ]));
    }
    rows.join("\n")
}

/// The event-to-form mappings: enrollment maps to the configuration
/// form, every sampling event to the survey form.
pub fn event_mappings_csv(config: &ScheduleConfig, artifact: &ScheduleArtifact) -> String {
    let naming = &config.naming;
    let arm = naming.arm_num;
    let mut rows = vec![plain_row(&[
        "arm_num".into(),
        "unique_event_name".into(),
        "form".into(),
    ])];
    rows.push(plain_row(&[
        arm.to_string(),
        naming.enrollment_event_unique(),
        naming.config_form.clone(),
    ]));
    for binding in &artifact.events {
        rows.push(plain_row(&[
            arm.to_string(),
            format!("{}_arm_{arm}", binding.event_name),
            naming.survey_form.clone(),
        ]));
    }
    rows.join("\n")
}

/// Automated survey invitations: one per sampling event, sent TIME_LAG
/// relative to that event's delivery field.
pub fn asi_csv(config: &ScheduleConfig, artifact: &ScheduleArtifact) -> String {
    let naming = &config.naming;
    let asi = &config.asi;
    let arm = naming.arm_num;
    let enrollment = naming.enrollment_event_unique();

    let mut rows = vec![quoted_row(&ASI_HEADERS.map(String::from))];

    for binding in &artifact.events {
        let event_unique = format!("{}_arm_{arm}", binding.event_name);
        let deliver_field = deliver_field_name(naming, binding.day, binding.window as u32 + 1);
        let deliver_ref = format!("[{enrollment}][{deliver_field}]");
        let logic = qualify_logic(&asi.logic, &enrollment);

        let cells: [String; 33] = [
            naming.survey_form.clone(),
            event_unique,
            String::new(),
            String::new(),
            "0".into(),
            "DAYS".into(),
            String::new(),
            "1".into(),
            asi.subject.clone(),
            asi.body.clone(),
            asi.sender.clone(),
            String::new(),
            "AND".into(),
            logic,
            "TIME_LAG".into(),
            "0".into(),
            "0".into(),
            "0".into(),
            deliver_ref,
            "after".into(),
            String::new(),
            String::new(),
            String::new(),
            "EMAIL".into(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            "0".into(),
            "1".into(),
        ];
        rows.push(quoted_row(&cells));
    }

    rows.join("\n")
}

/// Splice the enrollment-event prefix into bare `[field]` references
/// so the send condition evaluates against enrollment-arm data.
fn qualify_logic(logic: &str, enrollment_unique: &str) -> String {
    if !logic.contains('[') || logic.contains(&format!("[{enrollment_unique}]")) {
        return logic.to_string();
    }
    let Ok(re) = regex::Regex::new(r"\[([^\]]+)\]") else {
        return logic.to_string();
    };
    re.replace_all(logic, format!("[{enrollment_unique}][$1]"))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualify_logic_prefixes_bare_references() {
        assert_eq!(
            qualify_logic("[email] <> \"\"", "enrollment_arm_1"),
            "[enrollment_arm_1][email] <> \"\""
        );
    }

    #[test]
    fn qualify_logic_leaves_qualified_references_alone() {
        let logic = "[enrollment_arm_1][email] <> \"\"";
        assert_eq!(qualify_logic(logic, "enrollment_arm_1"), logic);
    }

    #[test]
    fn qualify_logic_passes_plain_text_through() {
        assert_eq!(qualify_logic("1 = 1", "enrollment_arm_1"), "1 = 1");
    }

    #[test]
    fn csv_cells_escape_embedded_quotes() {
        let row = quoted_row(&["say \"hi\"".into()]);
        assert_eq!(row, "\"say \"\"hi\"\"\"");
    }
}
