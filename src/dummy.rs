use crate::form::InputDescriptor;

/// Placeholder value for a declared input type, if the type is one we fill.
pub fn dummy_value_for(input_type: &str) -> Option<&'static str> {
    let value = match input_type {
        "text" => "test",
        "email" => "test@example.com",
        "password" => "test123",
        "number" => "123456",
        "tel" => "1234567890",
        "select-one" | "radio" | "checkbox" | "submit" => "test",
        _ => return None,
    };
    Some(value)
}

/// Overwrite each descriptor's value from the type table. Unknown types keep
/// whatever value they had. Order and every other field are untouched.
pub fn prepare_dummy_data(inputs: Vec<InputDescriptor>) -> Vec<InputDescriptor> {
    inputs
        .into_iter()
        .map(|mut input| {
            if let Some(value) = dummy_value_for(&input.input_type) {
                input.value = value.to_string();
            }
            input
        })
        .collect()
}
