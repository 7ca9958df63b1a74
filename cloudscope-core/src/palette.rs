use cloudscope_scanner::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Two-tone radial gradient of a node: `inner` at the centre, `outer` at the
/// rim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryPalette {
    pub inner: Rgb,
    pub outer: Rgb,
}

pub fn palette_for(category: Category) -> CategoryPalette {
    let (inner, outer) = match category {
        Category::Compute => (Rgb(0xFF, 0xB8, 0x4D), Rgb(0xFF, 0x99, 0x00)),
        Category::ObjectStore => (Rgb(0x7C, 0xC3, 0x5A), Rgb(0x56, 0x9A, 0x31)),
        Category::ManagedDatabase => (Rgb(0x6B, 0x75, 0xE0), Rgb(0x3B, 0x48, 0xCC)),
        Category::Function => (Rgb(0xF5, 0x85, 0x36), Rgb(0xC7, 0x51, 0x1F)),
        Category::Unrecognized => (Rgb(0x5A, 0x6B, 0x80), Rgb(0x23, 0x2F, 0x3E)),
    };
    CategoryPalette { inner, outer }
}

/// Cuts `name` to `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_label(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let mut out: String = name.chars().take(max_chars).collect();
    out.push('…');
    out
}
