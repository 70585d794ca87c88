use crate::config::Settings;
use crate::core::step::Step;
use crate::host::message::{ButtonUpdate, NavButton};

/// Outcome of a request to leave the current step forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Validation rejected the step; stay put and tell nobody.
    Blocked,
    /// Ask the host to move to the next step.
    NextStep,
    /// Last step: save and close.
    Finish,
}

/// Tracks which step is current. The host owns navigation: the index only
/// moves when the host confirms a step with `gotoStep`.
#[derive(Debug, Clone)]
pub struct StepWizard {
    steps: Vec<Step>,
    current: usize,
}

impl StepWizard {
    pub fn new(steps: Vec<Step>) -> Self {
        let steps = if steps.is_empty() {
            Step::default_steps()
        } else {
            steps
        };
        Self { steps, current: 0 }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_step(&self) -> &Step {
        &self.steps[self.current]
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.steps.len()
    }

    pub fn request_advance(&self, valid: bool) -> Advance {
        if !valid {
            Advance::Blocked
        } else if self.is_last() {
            Advance::Finish
        } else {
            Advance::NextStep
        }
    }

    /// True when the host should be asked for the previous step.
    pub fn request_retreat(&self) -> bool {
        !self.is_first()
    }

    /// Adopts the step with `key`. Unknown keys leave the wizard untouched.
    pub fn goto_step(&mut self, key: &str) -> bool {
        match self.steps.iter().position(|step| step.key == key) {
            Some(index) => {
                self.current = index;
                true
            }
            None => false,
        }
    }

    pub fn button_updates(&self, settings: &Settings) -> [ButtonUpdate; 2] {
        let next_label = if self.is_last() {
            settings.done_label.clone()
        } else {
            settings.next_label.clone()
        };
        [
            ButtonUpdate {
                button: NavButton::Next,
                text: Some(next_label),
                visible: true,
            },
            ButtonUpdate {
                button: NavButton::Back,
                text: None,
                visible: !self.is_first(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wizard() -> StepWizard {
        StepWizard::new(vec![
            Step::new("Contact", "contact"),
            Step::new("Message", "message"),
            Step::new("Review", "review"),
        ])
    }

    #[test]
    fn advance_depends_on_validity_and_position() {
        let mut wizard = wizard();
        assert_eq!(wizard.request_advance(false), Advance::Blocked);
        assert_eq!(wizard.request_advance(true), Advance::NextStep);

        assert!(wizard.goto_step("review"));
        assert_eq!(wizard.request_advance(true), Advance::Finish);
        assert_eq!(wizard.request_advance(false), Advance::Blocked);
    }

    #[test]
    fn retreat_is_a_no_op_on_first_step() {
        let mut wizard = wizard();
        assert!(!wizard.request_retreat());
        wizard.goto_step("message");
        assert!(wizard.request_retreat());
    }

    #[test]
    fn unknown_step_keys_are_ignored() {
        let mut wizard = wizard();
        wizard.goto_step("message");
        assert!(!wizard.goto_step("nowhere"));
        assert_eq!(wizard.current_step().key, "message");
    }

    #[test]
    fn buttons_follow_position() {
        let settings = Settings::default();
        let mut wizard = wizard();

        let [next, back] = wizard.button_updates(&settings);
        assert_eq!(next.text.as_deref(), Some("Next"));
        assert!(!back.visible);

        wizard.goto_step("review");
        let [next, back] = wizard.button_updates(&settings);
        assert_eq!(next.text.as_deref(), Some("Done"));
        assert!(back.visible);
    }

    #[test]
    fn empty_step_list_gets_default_step() {
        let wizard = StepWizard::new(Vec::new());
        assert_eq!(wizard.len(), 1);
        assert!(wizard.is_first() && wizard.is_last());
        assert_eq!(wizard.current_step().key, "configure");
    }
}
