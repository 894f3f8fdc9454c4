//! The three wizard flows and their wire contract with the forms API

use super::field::{FieldDefinition, FieldRule};
use super::step::{StepDefinition, OTHER_OPTION};

/// Which flow the user is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FormType {
    StartProject,
    JoinTeam,
    DropLine,
    #[default]
    None,
}

/// Wire id and input type of one answer key in a submission payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireField {
    pub id: u32,
    pub key: &'static str,
    /// Type tag expected by the forms API
    pub kind: &'static str,
}

const fn wire(id: u32, key: &'static str, kind: &'static str) -> WireField {
    WireField { id, key, kind }
}

static CONTACT_FIELDS: [FieldDefinition; 4] = [
    FieldDefinition::text("fullName", "Full Name", FieldRule::PersonName)
        .with_placeholder("Jane Doe"),
    FieldDefinition::email("email", "Email"),
    FieldDefinition::phone("phone", "Phone"),
    FieldDefinition::text("agencyName", "Company / Agency", FieldRule::Agency),
];

static PROJECT_DETAIL_FIELDS: [FieldDefinition; 2] = [
    FieldDefinition::text("projectTitle", "Project Title", FieldRule::Title),
    FieldDefinition::textarea("projectDescription", "Project Description", FieldRule::Description),
];

static START_PROJECT_STEPS: [StepDefinition; 7] = [
    StepDefinition::fields("contactDetails", "Tell us about yourself", &CONTACT_FIELDS)
        .with_description("So we know who to get back to"),
    StepDefinition::multiselect(
        "projectType",
        "What do you need help with?",
        &[
            "Web Development",
            "Mobile App",
            "UI/UX Design",
            "Branding",
            "Digital Marketing",
            OTHER_OPTION,
        ],
    )
    .with_other("projectTypeOther"),
    StepDefinition::radio(
        "budget",
        "What is your budget?",
        &["Under $5k", "$5k - $15k", "$15k - $50k", "$50k+"],
    )
    .with_description("A rough range is fine"),
    StepDefinition::radio(
        "timeline",
        "When do you want to start?",
        &["ASAP", "1-3 months", "3-6 months", "Flexible", OTHER_OPTION],
    )
    .with_other("timelineOther"),
    StepDefinition::fields("projectDetails", "Describe your project", &PROJECT_DETAIL_FIELDS),
    StepDefinition::file(
        "attachment",
        "Attach a brief (optional)",
        "PDF, DOC, DOCX, PNG or JPG up to 10MB",
    ),
    StepDefinition::free_text("additionalNotes", "Anything else we should know?", false),
];

static START_PROJECT_WIRE: [WireField; 13] = [
    wire(1, "fullName", "text"),
    wire(2, "email", "email"),
    wire(3, "phone", "phone"),
    wire(4, "agencyName", "text"),
    wire(5, "projectType", "checkbox"),
    wire(6, "budget", "radio"),
    wire(7, "timeline", "radio"),
    wire(8, "projectTitle", "text"),
    wire(9, "projectDescription", "textarea"),
    wire(10, "attachment", "fileupload"),
    wire(11, "additionalNotes", "textarea"),
    wire(12, "projectTypeOther", "text"),
    wire(13, "timelineOther", "text"),
];

static PERSONAL_FIELDS: [FieldDefinition; 3] = [
    FieldDefinition::text("fullName", "Full Name", FieldRule::PersonName),
    FieldDefinition::email("email", "Email"),
    FieldDefinition::phone("phone", "Phone"),
];

static JOIN_TEAM_STEPS: [StepDefinition; 6] = [
    StepDefinition::fields("personalDetails", "Who are you?", &PERSONAL_FIELDS),
    StepDefinition::radio(
        "role",
        "Which role are you applying for?",
        &[
            "Frontend Developer",
            "Backend Developer",
            "Designer",
            "Project Manager",
            OTHER_OPTION,
        ],
    )
    .with_other("roleOther"),
    StepDefinition::radio(
        "experience",
        "How much experience do you have?",
        &["0-1 years", "1-3 years", "3-5 years", "5+ years"],
    ),
    StepDefinition::multiselect(
        "skills",
        "Which skills do you bring?",
        &["React", "Next.js", "Node.js", "WordPress", "Figma", OTHER_OPTION],
    )
    .with_other("skillsOther"),
    StepDefinition::file("resume", "Upload your resume", "PDF, DOC or DOCX up to 10MB"),
    StepDefinition::free_text("coverLetter", "Why do you want to join us?", true),
];

static JOIN_TEAM_WIRE: [WireField; 10] = [
    wire(1, "fullName", "text"),
    wire(2, "email", "email"),
    wire(3, "phone", "phone"),
    wire(4, "role", "radio"),
    wire(5, "experience", "radio"),
    wire(6, "skills", "checkbox"),
    wire(7, "resume", "fileupload"),
    wire(8, "coverLetter", "textarea"),
    wire(9, "roleOther", "text"),
    wire(10, "skillsOther", "text"),
];

static DROP_LINE_FIELDS: [FieldDefinition; 5] = [
    FieldDefinition::text("fullName", "Full Name", FieldRule::PersonName),
    FieldDefinition::email("email", "Email"),
    FieldDefinition::phone("phone", "Phone"),
    FieldDefinition::select(
        "enquiryType",
        "Enquiry Type",
        &["General Question", "Partnership", "Support", "Careers"],
    ),
    FieldDefinition::textarea("message", "Message", FieldRule::LongText),
];

static DROP_LINE_STEPS: [StepDefinition; 1] = [StepDefinition::fields(
    "dropLine",
    "Drop us a line",
    &DROP_LINE_FIELDS,
)];

static DROP_LINE_WIRE: [WireField; 5] = [
    wire(1, "fullName", "text"),
    wire(2, "email", "email"),
    wire(3, "phone", "phone"),
    wire(4, "enquiryType", "select"),
    wire(5, "message", "textarea"),
];

impl FormType {
    /// Flows offered by the selector, in display order
    pub const ALL: [FormType; 3] = [FormType::StartProject, FormType::JoinTeam, FormType::DropLine];

    /// Step sequence of the flow; empty for `None`
    pub fn steps(&self) -> &'static [StepDefinition] {
        match self {
            FormType::StartProject => &START_PROJECT_STEPS,
            FormType::JoinTeam => &JOIN_TEAM_STEPS,
            FormType::DropLine => &DROP_LINE_STEPS,
            FormType::None => &[],
        }
    }

    /// Template id on the forms API
    pub fn form_id(&self) -> Option<u32> {
        match self {
            FormType::StartProject => Some(1),
            FormType::JoinTeam => Some(2),
            FormType::DropLine => Some(3),
            FormType::None => None,
        }
    }

    /// Answer key to wire id mapping
    pub fn wire_fields(&self) -> &'static [WireField] {
        match self {
            FormType::StartProject => &START_PROJECT_WIRE,
            FormType::JoinTeam => &JOIN_TEAM_WIRE,
            FormType::DropLine => &DROP_LINE_WIRE,
            FormType::None => &[],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormType::StartProject => "Start a Project",
            FormType::JoinTeam => "Join the Team",
            FormType::DropLine => "Drop a Line",
            FormType::None => "",
        }
    }

    /// Key used to look up CMS copy for this flow
    pub fn copy_key(&self) -> &'static str {
        match self {
            FormType::StartProject => "startProject",
            FormType::JoinTeam => "joinTeam",
            FormType::DropLine => "dropLine",
            FormType::None => "selector",
        }
    }

    /// Upload folder hint for attachments of this flow
    pub fn upload_folder(&self) -> &'static str {
        match self {
            FormType::JoinTeam => "resumes",
            _ => "project-briefs",
        }
    }
}
