//! Prompt synthesis and multi-choice staging helpers.

use super::model::Answers;

/// Substituted when no additional features were given.
pub const NO_ADDITIONAL_FEATURES: &str = "None specified";

/// Greeting shown at the start of every session.
pub const WELCOME_MESSAGE: &str = "Hi! I'm your AI website generator. I'll ask you a few questions to understand what kind of website you want, then create it for you instantly! Let's get started.";

pub const PROMPT_READY_MESSAGE: &str = "Perfect! I've analyzed your requirements and created a detailed prompt for your website. Please review it below and click 'Generate Website' when you're ready!";

pub const GENERATING_MESSAGE: &str = "🚀 Generating your website... This may take a moment!";

pub const GENERATED_MESSAGE: &str = "✨ Your website has been generated successfully! You can see the live preview below and download the HTML file.";

pub const GENERATION_FAILED_MESSAGE: &str =
    "❌ Sorry, there was an error generating your website. Please try again.";

/// Build the generation request from a complete set of answers.
///
/// Pure template substitution: identical answers always produce the same
/// bytes.
pub fn synthesize_request(answers: &Answers) -> String {
    let sections = answers.sections.join(", ");
    let features = if answers.additional_features.is_empty() {
        NO_ADDITIONAL_FEATURES
    } else {
        answers.additional_features.as_str()
    };

    format!(
        "Create a complete, professional, all-in-one HTML website for a {business} business. \n\
         \n\
         Design Requirements:\n\
         - Color scheme: {colors}\n\
         - Layout style: {layout}\n\
         - Overall style: {style}\n\
         - Include these sections: {sections}\n\
         - Additional features: {features}\n\
         \n\
         Technical Requirements:\n\
         - Single HTML file with embedded CSS and JavaScript\n\
         - Fully responsive design that works on all devices\n\
         - Modern, clean, and professional appearance\n\
         - Include placeholder content that's relevant to the business type\n\
         - Use modern CSS features like flexbox/grid for layout\n\
         - Include smooth scrolling and subtle animations\n\
         - Optimize for fast loading and good user experience\n\
         - Include proper meta tags and semantic HTML structure\n\
         \n\
         Make it look professional and ready to use immediately. Include realistic placeholder content, images (use placeholder image services), and make sure all sections flow together cohesively.",
        business = answers.business_type,
        colors = answers.colors,
        layout = answers.layout,
        style = answers.style,
    )
}

/// Toggle `option` in a multi-choice staging list.
///
/// Removes it when present, otherwise appends it. Order of first selection
/// is preserved.
pub fn toggle_multi_choice_selection(staging: &[String], option: &str) -> Vec<String> {
    if staging.iter().any(|s| s == option) {
        staging.iter().filter(|s| *s != option).cloned().collect()
    } else {
        let mut next = staging.to_vec();
        next.push(option.to_string());
        next
    }
}
