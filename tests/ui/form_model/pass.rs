use leadform::form::{FieldKind, FormModel, FormValues};

#[derive(Debug, leadform::form::FormModel)]
struct DemoForm {
    email: String,
}

fn main() {
    let fields = DemoForm::descriptors();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].kind_ref(), FieldKind::Text);
    assert!(!fields[0].is_required());

    let values = FormValues::from_iter([("email", "a@leadform.dev")]);
    let model = DemoForm::from_values(&values);
    assert_eq!(model.email, "a@leadform.dev");
}
