use crate::domain::UserRole;

const AVAILABILITY_KEYWORDS: &[&str] = &["available", "time", "when", "schedule"];
const MEETING_KEYWORDS: &[&str] = &["interview", "call", "chat", "meet"];

/// Fallback when the caller has no application context to pull a title from
const GENERIC_ROLE: &str = "the position";

/// Produce a canned reply for a conversation, keyed off the caller's role and
/// keyword matches in the last message received from the other participant.
///
/// Availability keywords take precedence over meeting keywords; anything else
/// falls through to a generic interest template.
pub fn suggest_reply(role: UserRole, other_name: &str, last_received: Option<&str>) -> String {
    if role == UserRole::Recruiter {
        return format!(
            "Hello {},\n\n\
             Thank you for your application and interest in our company. \
             I have reviewed your profile and was impressed by your experience.\n\n\
             We would like to move forward with the next steps. Please let me know \
             your availability for a brief discussion this week regarding the role.\n\n\
             Looking forward to hearing from you.",
            other_name
        );
    }

    let last_content = last_received.map(str::to_lowercase).unwrap_or_default();
    let contains_any = |keywords: &[&str]| keywords.iter().any(|w| last_content.contains(w));

    if contains_any(AVAILABILITY_KEYWORDS) {
        format!(
            "Hi {},\n\n\
             Thank you for following up. I am definitely interested in discussing this further.\n\n\
             I am available this Tuesday or Thursday afternoon (after 2 PM). Please let me know \
             if either of those works for you, or feel free to suggest another time.\n\n\
             Best regards,",
            other_name
        )
    } else if contains_any(MEETING_KEYWORDS) {
        format!(
            "Hi {},\n\n\
             Thank you for reaching out. I would be happy to discuss the role and my experience \
             in more detail.\n\n\
             Please let me know how you would like to proceed with the scheduling.\n\n\
             Best regards,",
            other_name
        )
    } else {
        format!(
            "Dear {},\n\n\
             Thank you for connecting. I am very interested in the {} role at your company.\n\n\
             My background aligns well with the requirements, and I would appreciate the \
             opportunity to discuss how I can contribute to your team.\n\n\
             Best regards,",
            other_name, GENERIC_ROLE
        )
    }
}
