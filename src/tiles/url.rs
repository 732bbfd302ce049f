/// Tile server URL template.
///
/// Placeholders: `{zoom}` (alias `{z}`), `{x}`, `{y}` and an optional `{switch:a,b,c}` whose
/// options are handed out round-robin, one per expanded tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileUrlTemplate {
    template: String,
    switch: Option<(usize, usize, Vec<String>)>,
    counter: usize,
}

impl TileUrlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let switch = template.find("{switch:").and_then(|start| {
            let end = start + template[start..].find('}')?;
            let body = &template[start + "{switch:".len()..end];
            if body.contains('{') {
                return None;
            }
            let options = body
                .split(',')
                .map(|s| s.trim().to_owned())
                .collect();
            Some((start, end + 1, options))
        });
        Self {
            template,
            switch,
            counter: 0,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn expand(&mut self, zoom: u32, x: u32, y: u32) -> String {
        let mut url = self.template.clone();
        if let Some((start, end, options)) = &self.switch
            && !options.is_empty()
        {
            let pick = &options[self.counter % options.len()];
            self.counter += 1;
            url.replace_range(*start..*end, pick);
        }
        url.replace("{zoom}", &zoom.to_string())
            .replace("{z}", &zoom.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tiles/url.rs"]
mod tests;
