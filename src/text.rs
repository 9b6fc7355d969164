//! Text output for the page overlays (greeting, year label, countdown).
//!
//! In the browser the text goes into DOM elements next to the canvas. Native
//! builds have no DOM, so the text is logged instead.

pub trait TextSink {
    fn set_text(&mut self, text: &str);
}

/// Logs each distinct text once under the given name.
#[derive(Debug)]
pub struct LogText {
    name: &'static str,
    last: Option<String>,
}

impl LogText {
    pub fn new(name: &'static str) -> Self {
        Self { name, last: None }
    }
}

impl TextSink for LogText {
    fn set_text(&mut self, text: &str) {
        if self.last.as_deref() == Some(text) {
            return;
        }
        log::info!("{}: {}", self.name, text);
        self.last = Some(text.to_string());
    }
}

/// Writes `textContent` of the element with the given id.
#[cfg(target_arch = "wasm32")]
#[derive(Debug)]
pub struct DomText {
    id: &'static str,
    element: Option<web_sys::Element>,
}

#[cfg(target_arch = "wasm32")]
impl DomText {
    pub fn new(id: &'static str) -> Self {
        let element = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(id));
        if element.is_none() {
            log::warn!("No element with id '{}' found, its text is dropped", id);
        }
        Self { id, element }
    }
}

#[cfg(target_arch = "wasm32")]
impl TextSink for DomText {
    fn set_text(&mut self, text: &str) {
        match &self.element {
            Some(element) => element.set_text_content(Some(text)),
            None => log::debug!("{}: {}", self.id, text),
        }
    }
}

/// The platform's default sink for the element or overlay called `name`.
pub fn text_sink(name: &'static str) -> Box<dyn TextSink> {
    #[cfg(target_arch = "wasm32")]
    {
        Box::new(DomText::new(name))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(LogText::new(name))
    }
}
