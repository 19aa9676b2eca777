use std::fmt::Write;

use crate::action::{ActionSet, SmartAction};

const PERSONA: &str = "\
Persona:
You are a senior software developer working in a collaborative engineering team. The team uses a chat tool for communication and coordination.

Context:
Imagine a scenario where team members interact with you on the chat platform to discuss various aspects of software development and product management. Your goal is to identify what action needs to be taken based on your colleague's message.";
const TASK: &str = "\
Your Task:
Given a user's chat message, determine the intent of the user and suggest a smart action only from the list of Known Actions. Then return the user's chat message and smart action suggestion as a JSON object shown in examples. Be attentive to various expressions and contexts related to code changes, collaboration, documentation and project management.";
const NO_EXAMPLES: &str = "(no examples)";

/// A (message, label) pair shown to the model to steer its labeling and output format.
#[derive(Clone, Debug, PartialEq)]
pub struct FewShotExample {
	pub user_message: String,
	pub smart_action: SmartAction,
}
impl FewShotExample {
	pub fn new(user_message: impl Into<String>, smart_action: SmartAction) -> Self {
		Self { user_message: user_message.into(), smart_action }
	}

	pub fn from_config(examples: &[sa_config::FewShotExample]) -> Vec<Self> {
		examples
			.iter()
			.map(|example| {
				Self::new(example.user_message.as_str(), SmartAction::new(example.smart_action.as_str()))
			})
			.collect()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderedPrompt {
	pub system: String,
	pub human: String,
}

/// Renders the classification prompt. Output depends only on the inputs.
#[derive(Clone, Debug)]
pub struct PromptBuilder {
	actions: ActionSet,
}
impl PromptBuilder {
	pub fn new(actions: ActionSet) -> Self {
		Self { actions }
	}

	pub fn actions(&self) -> &ActionSet {
		&self.actions
	}

	pub fn render(&self, message: &str, examples: &[FewShotExample]) -> RenderedPrompt {
		RenderedPrompt { system: self.system_prompt(examples), human: human_prompt(message) }
	}

	fn system_prompt(&self, examples: &[FewShotExample]) -> String {
		let sentinel = self.actions.not_recognised();
		let mut out = String::with_capacity(2_048);

		out.push_str(PERSONA);
		out.push_str("\n\nKnown Actions:\n");

		for action in self.actions.known() {
			let _ = writeln!(out, "- {action}");
		}

		let _ = writeln!(
			out,
			"- {sentinel} (if you could not determine the smart action from the Known Actions list)"
		);

		out.push_str("\nExamples:\n");

		if examples.is_empty() {
			out.push_str(NO_EXAMPLES);
			out.push('\n');
		}

		for example in examples {
			let user_message = serde_json::Value::from(example.user_message.as_str());
			let smart_action = serde_json::Value::from(example.smart_action.as_str());
			let _ = writeln!(out, r#"{{"userMessage":{user_message},"smartAction":{smart_action}}}"#);
		}

		out.push('\n');
		out.push_str(TASK);
		let _ = write!(
			out,
			" Most importantly, if you could not determine the smart action from the Known Actions list say \"{sentinel}\"."
		);

		out
	}
}

fn human_prompt(message: &str) -> String {
	format!("User Message: {message}\nSuggestion: ")
}
