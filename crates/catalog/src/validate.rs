//! Cross-validation of a workflow definition against the form catalog.
//!
//! Run at load time so navigation never meets a broken definition: the step
//! sequence must be sound, every step's form must exist, and every mapping
//! must name a real field on the form it reads from and the form it writes to.

use engine::WorkflowDefinition;

use crate::error::CatalogError;
use crate::forms::FormCatalog;

pub fn validate_definition(
    definition: &WorkflowDefinition,
    forms: &FormCatalog,
) -> Result<(), CatalogError> {
    engine::validate_steps(definition).map_err(|source| CatalogError::InvalidSteps {
        workflow: definition.id.clone(),
        source,
    })?;

    for (index, step) in definition.steps.iter().enumerate() {
        let schema = forms
            .get(&step.form_id)
            .ok_or_else(|| CatalogError::UnknownForm {
                workflow: definition.id.clone(),
                position: step.position,
                form_id: step.form_id.clone(),
            })?;

        for rule in &step.field_mappings {
            if schema.field(&rule.from).is_none() {
                return Err(CatalogError::UnknownMappingField {
                    workflow: definition.id.clone(),
                    position: step.position,
                    side: "from",
                    field: rule.from.clone(),
                    form_id: step.form_id.clone(),
                });
            }

            // validate_steps guarantees mappings only appear on non-final
            // steps, so the successor exists.
            let Some(next) = definition.steps.get(index + 1) else {
                continue;
            };
            let next_schema =
                forms
                    .get(&next.form_id)
                    .ok_or_else(|| CatalogError::UnknownForm {
                        workflow: definition.id.clone(),
                        position: next.position,
                        form_id: next.form_id.clone(),
                    })?;
            if next_schema.field(&rule.to).is_none() {
                return Err(CatalogError::UnknownMappingField {
                    workflow: definition.id.clone(),
                    position: step.position,
                    side: "to",
                    field: rule.to.clone(),
                    form_id: next.form_id.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{FieldMapping, StepDefinition};

    fn forms() -> FormCatalog {
        let schemas = serde_yaml::from_str::<Vec<crate::forms::FormSchema>>(
            r"
            - id: sc-100
              fields:
                - key: name
                  required: true
            - id: sc-103
              fields:
                - key: name
            ",
        )
        .unwrap();
        FormCatalog::new(schemas).unwrap()
    }

    fn step(position: u32, form_id: &str) -> StepDefinition {
        StepDefinition {
            position,
            form_id: form_id.into(),
            title: None,
            required: false,
            field_mappings: Vec::new(),
        }
    }

    #[test]
    fn valid_definition_passes() {
        let mut first = step(1, "sc-100");
        first.field_mappings.push(FieldMapping {
            from: "name".into(),
            to: "name".into(),
        });
        let definition = WorkflowDefinition::new(
            "small-claims",
            "Small Claims",
            vec![first, step(2, "sc-103")],
        );
        assert!(validate_definition(&definition, &forms()).is_ok());
    }

    #[test]
    fn unknown_form_reference_is_rejected() {
        let definition =
            WorkflowDefinition::new("w", "W", vec![step(1, "sc-100"), step(2, "sc-999")]);
        assert!(matches!(
            validate_definition(&definition, &forms()),
            Err(CatalogError::UnknownForm { position: 2, .. })
        ));
    }

    #[test]
    fn mapping_from_a_field_the_form_lacks_is_rejected() {
        let mut first = step(1, "sc-100");
        first.field_mappings.push(FieldMapping {
            from: "ghost".into(),
            to: "name".into(),
        });
        let definition = WorkflowDefinition::new("w", "W", vec![first, step(2, "sc-103")]);
        assert!(matches!(
            validate_definition(&definition, &forms()),
            Err(CatalogError::UnknownMappingField { side: "from", .. })
        ));
    }

    #[test]
    fn mapping_into_a_field_the_next_form_lacks_is_rejected() {
        let mut first = step(1, "sc-100");
        first.field_mappings.push(FieldMapping {
            from: "name".into(),
            to: "ghost".into(),
        });
        let definition = WorkflowDefinition::new("w", "W", vec![first, step(2, "sc-103")]);
        assert!(matches!(
            validate_definition(&definition, &forms()),
            Err(CatalogError::UnknownMappingField { side: "to", .. })
        ));
    }

    #[test]
    fn broken_step_sequence_is_rejected() {
        let definition =
            WorkflowDefinition::new("w", "W", vec![step(1, "sc-100"), step(3, "sc-103")]);
        assert!(matches!(
            validate_definition(&definition, &forms()),
            Err(CatalogError::InvalidSteps { .. })
        ));
    }
}
