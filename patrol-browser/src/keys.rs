use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType,
};

/// Keys the suite drives the page with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Tab,
    Enter,
}

impl Key {
    pub fn name(self) -> &'static str {
        match self {
            Key::Tab => "Tab",
            Key::Enter => "Enter",
        }
    }

    pub fn code(self) -> &'static str {
        self.name()
    }

    pub fn virtual_key_code(self) -> i64 {
        match self {
            Key::Tab => 9,
            Key::Enter => 13,
        }
    }

    /// Text payload carried by the key-down event, if the key produces one.
    pub fn text(self) -> Option<&'static str> {
        match self {
            Key::Tab => None,
            Key::Enter => Some("\r"),
        }
    }

    /// The CDP event pair for one press of this key.
    pub fn events(self) -> Vec<DispatchKeyEventParams> {
        let down_type = if self.text().is_some() {
            DispatchKeyEventType::KeyDown
        } else {
            DispatchKeyEventType::RawKeyDown
        };

        let mut down = DispatchKeyEventParams::builder()
            .r#type(down_type)
            .key(self.name())
            .code(self.code())
            .windows_virtual_key_code(self.virtual_key_code())
            .native_virtual_key_code(self.virtual_key_code());
        if let Some(text) = self.text() {
            down = down.text(text);
        }

        let up = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyUp)
            .key(self.name())
            .code(self.code())
            .windows_virtual_key_code(self.virtual_key_code())
            .native_virtual_key_code(self.virtual_key_code());

        vec![
            down.build().expect("key-down params are complete"),
            up.build().expect("key-up params are complete"),
        ]
    }
}
