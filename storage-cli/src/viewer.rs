// SPDX-License-Identifier: GPL-3.0-only

//! Renderers for an allocation result

use std::fmt::Write;

use num_format::{Locale, ToFormattedString};
use storage_types::{DiskAllocation, format_size};

const PALETTE: [&str; 5] = ["#666547", "#fb2e01", "#6fcb9f", "#ffe28a", "#fffeb3"];
const DISK_FILL: &str = "#f5f5f5";
const STYLE: &str = "stroke:black;stroke-width:2;";

/// Plain text table, one block per disk
pub struct TextViewer<'a> {
    allocation: &'a [DiskAllocation],
}

impl<'a> TextViewer<'a> {
    pub fn new(allocation: &'a [DiskAllocation]) -> Self {
        Self { allocation }
    }

    pub fn render(&self) -> String {
        let width = self
            .allocation
            .iter()
            .flat_map(|disk| &disk.spaces)
            .map(|space| space.space_id.len())
            .max()
            .unwrap_or(0)
            .max("SPACE".len());

        let mut out = String::new();
        for disk in self.allocation {
            let _ = writeln!(out, "{} ({})", disk.disk_id, format_size(disk.size, true));
            let _ = writeln!(out, "  {:<width$}  {:>14}", "SPACE", "SIZE (MiB)");
            for space in &disk.spaces {
                let _ = writeln!(
                    out,
                    "  {:<width$}  {:>14}",
                    space.space_id,
                    space.size.to_formatted_string(&Locale::en)
                );
            }
            let _ = writeln!(
                out,
                "  {:<width$}  {:>14}",
                "free",
                disk.free().to_formatted_string(&Locale::en)
            );
            out.push('\n');
        }
        out
    }
}

/// SVG picture with one bar per disk, spaces drawn left to right
pub struct SvgViewer<'a> {
    allocation: &'a [DiskAllocation],
}

impl<'a> SvgViewer<'a> {
    const MARGIN: f64 = 30.0;
    const BAR_WIDTH: f64 = 450.0;
    const BAR_HEIGHT: f64 = 60.0;
    const DISK_INTERVAL: f64 = 150.0;
    const LEGEND_GAP: f64 = 10.0;
    const LEGEND_LINE: f64 = 20.0;
    const LEGEND_WIDTH: f64 = 260.0;

    pub fn new(allocation: &'a [DiskAllocation]) -> Self {
        Self { allocation }
    }

    pub fn render(&self) -> String {
        // Bars are scaled against the largest disk.
        let largest = self
            .allocation
            .iter()
            .map(|disk| disk.size)
            .max()
            .unwrap_or(0)
            .max(1) as f64;
        let scale = Self::BAR_WIDTH / largest;

        let rows = self
            .allocation
            .iter()
            .map(|disk| disk.spaces.len() as f64 * Self::LEGEND_LINE + Self::LEGEND_LINE)
            .fold(Self::DISK_INTERVAL, f64::max);
        let width = 2.0 * Self::MARGIN + Self::BAR_WIDTH + Self::LEGEND_GAP + Self::LEGEND_WIDTH;
        let height = 2.0 * Self::MARGIN
            + (self.allocation.len().max(1) - 1) as f64 * Self::DISK_INTERVAL
            + rows;

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}">"#
        );
        let _ = writeln!(
            svg,
            r#"<g id="disks-group" transform="translate({0}, {0})">"#,
            Self::MARGIN
        );

        for (disk_idx, disk) in self.allocation.iter().enumerate() {
            let disk_id = escape(&disk.disk_id);
            let _ = writeln!(
                svg,
                r#"<g id="{disk_id}" transform="translate(0, {})">"#,
                disk_idx as f64 * Self::DISK_INTERVAL
            );
            let _ = writeln!(
                svg,
                r#"<text fill="black">{disk_id} size={}</text>"#,
                disk.size
            );
            let _ = writeln!(
                svg,
                r#"<g id="in-{disk_id}" transform="translate(0, 10)">"#
            );
            let _ = writeln!(
                svg,
                r#"<rect rx="5" ry="5" width="{:.2}" height="{}" style="fill:{DISK_FILL};{STYLE}"/>"#,
                disk.size as f64 * scale,
                Self::BAR_HEIGHT
            );

            let mut x = 0.0;
            for (space_idx, space) in disk.spaces.iter().enumerate() {
                if space.size == 0 {
                    continue;
                }
                let space_width = space.size as f64 * scale;
                let _ = writeln!(
                    svg,
                    r#"<rect id="{}" x="{x:.2}" y="0" rx="5" ry="5" width="{space_width:.2}" height="{}" style="fill:{};{STYLE}"/>"#,
                    escape(&format!("{}-{}", disk.disk_id, space.space_id)),
                    Self::BAR_HEIGHT,
                    color(space_idx)
                );
                x += space_width;
            }

            let legend_x = disk.size as f64 * scale + Self::LEGEND_GAP;
            for (space_idx, space) in disk.spaces.iter().enumerate() {
                let _ = writeln!(
                    svg,
                    r#"<text x="{legend_x:.2}" y="{}" fill="{}">{} size={}</text>"#,
                    (space_idx + 1) as f64 * Self::LEGEND_LINE,
                    color(space_idx),
                    escape(&space.space_id),
                    space.size
                );
            }

            svg.push_str("</g>\n</g>\n");
        }

        svg.push_str("</g>\n</svg>\n");
        svg
    }
}

fn color(space_idx: usize) -> &'static str {
    PALETTE[space_idx % PALETTE.len()]
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
