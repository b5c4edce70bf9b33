use gpui::SharedString;
use leadform::form::{FieldKind, FormModel, FormValues};

fn no_spaces(value: &str) -> Option<SharedString> {
    value.contains(' ').then(|| "no spaces".into())
}

#[derive(leadform::form::FormModel)]
struct SignupForm {
    #[field(kind = "email", id = "signup-email", label = "Email", required)]
    email: String,
    #[field(kind = "prefixed_text", prefix = "@", validator = no_spaces)]
    handle: String,
    #[field(kind = "textarea", name = "about_you", max_length = 140, placeholder = "Say hi")]
    about: String,
}

fn main() {
    let fields = SignupForm::descriptors();
    assert_eq!(fields[0].id_ref().to_string(), "signup-email");
    assert!(fields[0].is_required());
    assert_eq!(fields[1].kind_ref(), FieldKind::PrefixedText);
    assert!(fields[1].validator_ref().is_some());
    assert_eq!(fields[2].name_ref().to_string(), "about_you");
    assert!(fields[2].has_counter());

    let values = FormValues::from_iter([("about_you", "hello")]);
    let model = SignupForm::from_values(&values);
    assert_eq!(model.about, "hello");
    assert!(model.email.is_empty());
    assert!(model.handle.is_empty());
}
