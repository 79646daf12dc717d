//! Prompt assembly for policy analysis.
//!
//! No truncation or token budgeting is applied: every retrieved chunk is
//! included verbatim.

/// The fixed multi-part question asked of every policy.
pub const POLICY_QUESTION: &str = "What is the purpose of data collection?, \
What is the data that is collected?, \
what is the purpose of sharing collected data with third parties?, \
What third parties may get user data?";

/// Closed list of purposes the model may assign to a third party.
pub const DATA_SHARING_PURPOSES: [&str; 5] = [
    "maintaining functionality for end user",
    "User tracking",
    "data aggregation",
    "analytics",
    "targeted advertising",
];

fn default_instructions() -> String {
    format!(
        "Compose an exhaustive reply to the query using the search results given. \
Extract the entities mentioned in the text. \
First extract company names (if not mentioned refer to them as 'unnamed third parties'), \
then extract all data points collected, \
finally extract what data is being shared with the third parties \
and what specific purpose they intend to use it for. \
Desired format: Company names: <comma_separated_list_of_company_names>\n\
User data collected: <comma_separated_list_such_as_name_age_user_behaviour_on_app_IP_websites-visited, \
include other user data that is being collected from other sources>\n\
Data shared with third parties: <comma_separated_list_of_user_data_shared_with_third_parties>\n\
Purpose of data sharing (write_purpose_for_each_third_party_separately): \
choose from these options ({}). \
If the text does not relate to the privacy policy of an organization, ignore the questions asked. \
The answer should be somewhat verbose so as to make sense to the common user. \
Answer all questions comprehensively and break the answers to each question into separate paragraphs. \
Answer step-by-step.",
        DATA_SHARING_PURPOSES.join(", ")
    )
}

pub struct PromptBuilder {
    instructions: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            instructions: default_instructions(),
        }
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the instruction block.
    pub fn with_instructions(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
        }
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn build(&self, chunks: &[String], question: &str) -> String {
        let mut prompt = String::from("search results:\n\n");
        for chunk in chunks {
            prompt.push_str(chunk);
            prompt.push_str("\n\n");
        }

        prompt.push_str("Instructions: ");
        prompt.push_str(&self.instructions);
        prompt.push_str("\n\nQuery: ");
        prompt.push_str(question);
        prompt.push_str("\nAnswer:");
        prompt
    }
}
