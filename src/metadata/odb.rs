//! MIDAS online database (ODB) dumps.
//!
//! A run file embeds the ODB as XML at begin and end of run:
//!
//! ```text
//! <odb root="/" ...>
//!   <dir name="Experiment">
//!     <dir name="Variables">
//!       <key name="MPETRFAmp" type="DOUBLE">0.25</key>
//!     </dir>
//!   </dir>
//! </odb>
//! ```
//!
//! Values are addressed by directory depth, directory name and key name.

use std::fmt;

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

use super::MetadataError;

/// A directory in an ODB dump
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OdbDir {
    /// Directory name (empty for the root)
    pub name: String,
    /// Sub-directories in document order
    pub dirs: Vec<OdbDir>,
    /// Keys in document order
    pub keys: Vec<OdbKey>,
}

impl OdbDir {
    fn named(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// First direct key with the given name
    pub fn key(&self, name: &str) -> Option<&str> {
        self.keys
            .iter()
            .find(|k| k.name == name)
            .map(|k| k.value.as_str())
    }
}

/// A scalar ODB key
#[derive(Debug, Clone, PartialEq)]
pub struct OdbKey {
    /// Key name
    pub name: String,
    /// Text content
    pub value: String,
}

/// Location of a value inside an ODB dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OdbAddress<'a> {
    /// Number of directory levels below the root
    pub depth: usize,
    /// Name of the directory at that depth
    pub dir: &'a str,
    /// Key name inside that directory
    pub key: &'a str,
}

impl<'a> OdbAddress<'a> {
    /// Create an address
    pub const fn new(depth: usize, dir: &'a str, key: &'a str) -> Self {
        Self { depth, dir, key }
    }

    fn path(&self) -> String {
        let mut path = String::from(".");
        for _ in 0..self.depth {
            path.push_str("/dir");
        }
        path
    }

    pub(crate) fn access_error(&self) -> MetadataError {
        MetadataError::ConfigAccess {
            path: self.path(),
            dir: self.dir.to_string(),
            key: self.key.to_string(),
        }
    }
}

impl fmt::Display for OdbAddress<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.path(), self.dir, self.key)
    }
}

/// Parsed ODB dump
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OdbTree {
    root: OdbDir,
}

impl OdbTree {
    /// Parse an `<odb>` XML fragment
    pub fn parse(xml: &[u8]) -> Result<Self, MetadataError> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut stack: Vec<OdbDir> = Vec::new();
        let mut root: Option<OdbDir> = None;
        let mut open_key: Option<OdbKey> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.name().as_ref() {
                    b"odb" => stack.push(OdbDir::default()),
                    b"dir" => stack.push(OdbDir::named(name_attribute(e)?)),
                    b"key" => {
                        open_key = Some(OdbKey {
                            name: name_attribute(e)?,
                            value: String::new(),
                        });
                    }
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                    b"dir" => {
                        if let Some(parent) = stack.last_mut() {
                            parent.dirs.push(OdbDir::named(name_attribute(e)?));
                        }
                    }
                    b"key" => {
                        if let Some(parent) = stack.last_mut() {
                            parent.keys.push(OdbKey {
                                name: name_attribute(e)?,
                                value: String::new(),
                            });
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(ref t)) => {
                    if let Some(key) = open_key.as_mut() {
                        key.value.push_str(&text_of(t));
                    }
                }
                Ok(Event::End(ref e)) => match e.name().as_ref() {
                    b"key" => {
                        if let (Some(key), Some(parent)) = (open_key.take(), stack.last_mut()) {
                            parent.keys.push(key);
                        }
                    }
                    b"dir" => {
                        if stack.len() > 1 {
                            if let Some(dir) = stack.pop() {
                                if let Some(parent) = stack.last_mut() {
                                    parent.dirs.push(dir);
                                }
                            }
                        }
                    }
                    b"odb" => {
                        root = stack.pop();
                        break;
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(MetadataError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }

        // Tolerate a dump cut off before its closing tags.
        let root = match root {
            Some(root) => root,
            None => {
                while stack.len() > 1 {
                    if let Some(dir) = stack.pop() {
                        if let Some(parent) = stack.last_mut() {
                            parent.dirs.push(dir);
                        }
                    }
                }
                stack.pop().unwrap_or_default()
            }
        };

        Ok(Self { root })
    }

    /// Root directory
    pub fn root(&self) -> &OdbDir {
        &self.root
    }

    /// First directory named `name` exactly `depth` levels below the root
    pub fn find_dir(&self, depth: usize, name: &str) -> Option<&OdbDir> {
        find_at_depth(&self.root, depth, name)
    }

    /// Resolve an address, or fail with [`MetadataError::ConfigAccess`]
    pub fn get(&self, address: &OdbAddress<'_>) -> Result<&str, MetadataError> {
        self.find_dir(address.depth, address.dir)
            .and_then(|dir| dir.key(address.key))
            .ok_or_else(|| address.access_error())
    }

    /// Resolve an address, returning `None` when it does not exist
    pub fn lookup(&self, address: &OdbAddress<'_>) -> Option<&str> {
        self.get(address).ok()
    }
}

fn find_at_depth<'a>(dir: &'a OdbDir, depth: usize, name: &str) -> Option<&'a OdbDir> {
    match depth {
        0 => None,
        1 => dir.dirs.iter().find(|d| d.name == name),
        _ => dir
            .dirs
            .iter()
            .find_map(|child| find_at_depth(child, depth - 1, name)),
    }
}

fn name_attribute(e: &BytesStart<'_>) -> Result<String, MetadataError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| MetadataError::XmlError(quick_xml::Error::from(err)))?;
        if attr.key.as_ref() == b"name" {
            return Ok(decode_latin1(&attr.value));
        }
    }
    Ok(String::new())
}

fn text_of(t: &BytesText<'_>) -> String {
    decode_latin1(t)
}

/// ODB dumps are ISO-8859-1, and the declaration is lost once a dump is cut
/// out of the run file. Every byte maps to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    let raw: String = bytes.iter().map(|&b| char::from(b)).collect();
    match quick_xml::escape::unescape(&raw) {
        Ok(text) => text.into_owned(),
        Err(_) => raw,
    }
}
