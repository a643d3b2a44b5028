//! The closed set of interactive capability kinds eligible for event wiring.
//!
//! Each variant carries its own signal-shape descriptor (canonical signal
//! name, handler suffix, handler parameter list). Supporting a new
//! interactive control is a variant addition here, not an open-ended
//! dispatch at emission time.

/// Interactive capability kinds the single-script strategy wires up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractiveKind {
    Button,
    Toggle,
    InputField,
    Slider,
    Scrollbar,
    Dropdown,
}

impl InteractiveKind {
    /// Classify a capability short type name, or `None` for non-interactive
    /// capabilities (which get a field and initialization but no wiring).
    pub fn classify(capability_short: &str) -> Option<Self> {
        match capability_short {
            "Button" => Some(Self::Button),
            "Toggle" => Some(Self::Toggle),
            "InputField" => Some(Self::InputField),
            "Slider" => Some(Self::Slider),
            "Scrollbar" => Some(Self::Scrollbar),
            "Dropdown" => Some(Self::Dropdown),
            _ => None,
        }
    }

    /// The capability's canonical activated/value-changed signal.
    pub fn signal(self) -> &'static str {
        match self {
            Self::Button => "onClick",
            Self::Toggle | Self::Slider | Self::Scrollbar | Self::Dropdown => "onValueChanged",
            Self::InputField => "onEndEdit",
        }
    }

    /// Suffix appended to `On<FieldName>` for the handler method name.
    pub fn event_suffix(self) -> &'static str {
        match self {
            Self::Button => "Click",
            Self::InputField => "EndEdit",
            Self::Toggle | Self::Slider | Self::Scrollbar | Self::Dropdown => "ValueChanged",
        }
    }

    /// Parameter list of the generated handler stub.
    pub fn handler_params(self) -> &'static str {
        match self {
            Self::Button => "",
            Self::Toggle => "bool isOn",
            Self::InputField => "string text",
            Self::Slider | Self::Scrollbar => "float value",
            Self::Dropdown => "int index",
        }
    }

    /// Log statement emitted in the handler stub body.
    pub fn handler_log(self, field_name: &str) -> String {
        match self {
            Self::Button => format!("Debug.Log(\"{field_name} clicked\");"),
            Self::Toggle => format!("Debug.Log($\"{field_name} toggled: {{isOn}}\");"),
            Self::InputField => format!("Debug.Log($\"{field_name} input ended: {{text}}\");"),
            Self::Slider | Self::Scrollbar => {
                format!("Debug.Log($\"{field_name} value changed: {{value}}\");")
            }
            Self::Dropdown => format!("Debug.Log($\"{field_name} option changed: {{index}}\");"),
        }
    }
}

/// Handler method name for a field of a given interactive kind.
pub fn handler_method_name(field_name: &str, kind: InteractiveKind) -> String {
    format!("On{}{}", field_name, kind.event_suffix())
}
