use thiserror::Error;

/// Usage errors of the [`XmlWriter`]
///
/// All of these indicate a bug in the caller, not a problem with the input data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WriterError {
    #[error("attribute \"{attribute}\" can only be written directly after a start tag or another attribute")]
    NotInAttributeBlock { attribute: String },

    #[error("content can only be written inside of a tag")]
    NoOpenTag,

    #[error("cannot close {requested} tag(s), only {open} are open")]
    TooManyCloseTags { requested: usize, open: usize },

    #[error("the document is complete, nothing can be added after the final end tag")]
    DocumentClosed,
}

/// The state of the [`XmlWriter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// no tag is open
    None,
    /// the name of a start tag has been written, attributes may follow
    InAttributeBlock,
    /// an attribute has been started, its closing quote is still pending
    InAttribute,
    /// the start tag is complete and text content has been written
    InContent,
    /// a child tag was just closed
    TagEnd,
}

/// Writes well-formed, indented XML through a sequence of open / attribute / content / close operations
///
/// Pending attribute values and start tags are completed lazily by the next operation, so
/// that empty elements can be written in their self-closing form.
#[derive(Debug)]
pub struct XmlWriter {
    state: WriterState,
    tags: Vec<String>,
    finished: bool,
    outstring: String,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            state: WriterState::None,
            tags: Vec::new(),
            finished: false,
            /* a whole document is built in this string; start with enough room for the header */
            outstring: String::with_capacity(4096),
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// number of currently open tags
    pub fn depth(&self) -> usize {
        self.tags.len()
    }

    /// true once the outermost tag has been closed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// open a new tag as a child of the current tag
    ///
    /// # Errors
    ///
    /// [`WriterError::DocumentClosed`] if the outermost tag of the document has already been closed
    pub fn open_tag(&mut self, name: &str) -> Result<(), WriterError> {
        if self.finished {
            return Err(WriterError::DocumentClosed);
        }
        self.close_attribute();
        match self.state {
            WriterState::InAttributeBlock => self.outstring.push_str(">\n"),
            WriterState::InContent => self.outstring.push('\n'),
            _ => {}
        }

        self.add_indent(self.tags.len());
        self.outstring.push('<');
        self.outstring.push_str(name);

        self.tags.push(name.to_string());
        self.state = WriterState::InAttributeBlock;
        Ok(())
    }

    /// add an attribute to the tag that was just opened
    ///
    /// # Errors
    ///
    /// [`WriterError::NotInAttributeBlock`] if content or a child tag has already been written
    pub fn attribute(&mut self, name: &str, value: &str) -> Result<(), WriterError> {
        self.close_attribute();
        if self.state != WriterState::InAttributeBlock {
            return Err(WriterError::NotInAttributeBlock {
                attribute: name.to_string(),
            });
        }

        self.outstring.push(' ');
        self.outstring.push_str(name);
        self.outstring.push_str("=\"");
        self.add_escaped(value, true);
        self.state = WriterState::InAttribute;
        Ok(())
    }

    /// add text content to the current tag
    ///
    /// # Errors
    ///
    /// [`WriterError::NoOpenTag`] or [`WriterError::DocumentClosed`] if there is no tag to hold the content
    pub fn content(&mut self, text: &str) -> Result<(), WriterError> {
        if self.finished {
            return Err(WriterError::DocumentClosed);
        }
        if self.tags.is_empty() {
            return Err(WriterError::NoOpenTag);
        }
        self.close_attribute();
        if self.state == WriterState::InAttributeBlock {
            self.outstring.push('>');
        }

        self.add_escaped(text, false);
        self.state = WriterState::InContent;
        Ok(())
    }

    /// close the innermost tag
    pub fn close_tag(&mut self) -> Result<(), WriterError> {
        self.close_tags(1)
    }

    /// close the `count` innermost tags
    ///
    /// A tag that has neither content nor children is written in self-closing form.
    ///
    /// # Errors
    ///
    /// [`WriterError::TooManyCloseTags`] if fewer than `count` tags are open. Nothing is written in this case.
    pub fn close_tags(&mut self, count: usize) -> Result<(), WriterError> {
        if count > self.tags.len() {
            return Err(WriterError::TooManyCloseTags {
                requested: count,
                open: self.tags.len(),
            });
        }

        self.close_attribute();
        for _ in 0..count {
            let Some(tag) = self.tags.pop() else {
                return Err(WriterError::NoOpenTag);
            };
            match self.state {
                WriterState::TagEnd => {
                    self.add_indent(self.tags.len());
                    self.add_end_tag(&tag);
                }
                WriterState::InContent => self.add_end_tag(&tag),
                WriterState::InAttributeBlock => self.outstring.push_str(" />\n"),
                WriterState::None | WriterState::InAttribute => return Err(WriterError::NoOpenTag),
            }
            // the parent of the tag that was just closed is now mid-content
            self.state = WriterState::TagEnd;
        }

        if self.tags.is_empty() {
            self.state = WriterState::None;
            self.finished = count > 0;
        }
        Ok(())
    }

    /// write a complete element containing only text: `<name>text</name>`
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<(), WriterError> {
        self.open_tag(name)?;
        self.content(text)?;
        self.close_tag()
    }

    /// the text that has been written so far
    pub fn materialize(&self) -> &str {
        &self.outstring
    }

    pub fn finish(self) -> String {
        self.outstring
    }

    // write the closing quote of an attribute value if one is pending
    fn close_attribute(&mut self) {
        if self.state == WriterState::InAttribute {
            self.outstring.push('"');
            self.state = WriterState::InAttributeBlock;
        }
    }

    fn add_end_tag(&mut self, tag: &str) {
        self.outstring.push_str("</");
        self.outstring.push_str(tag);
        self.outstring.push_str(">\n");
    }

    fn add_indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.outstring.push_str("  ");
        }
    }

    fn add_escaped(&mut self, text: &str, in_attribute: bool) {
        // escaping lots of strings is an expensive operation, so check if anything needs to be done first
        if text.contains(['&', '<', '>', '"']) {
            for c in text.chars() {
                match c {
                    '&' => self.outstring.push_str("&amp;"),
                    '<' => self.outstring.push_str("&lt;"),
                    '>' => self.outstring.push_str("&gt;"),
                    '"' if in_attribute => self.outstring.push_str("&quot;"),
                    _ => self.outstring.push(c),
                }
            }
        } else {
            self.outstring.push_str(text);
        }
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}
