//! Event helpers shared by the output-stage transformers.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag};

fn owned(s: CowStr<'_>) -> CowStr<'static> {
    CowStr::Boxed(s.to_string().into_boxed_str())
}

/// Detach an event from the source buffer it was parsed from.
pub fn into_static(event: Event<'_>) -> Event<'static> {
    match event {
        Event::Start(tag) => Event::Start(tag_into_static(tag)),
        Event::End(tag) => Event::End(tag),
        Event::Text(text) => Event::Text(owned(text)),
        Event::Code(code) => Event::Code(owned(code)),
        Event::Html(html) => Event::Html(owned(html)),
        Event::InlineHtml(html) => Event::InlineHtml(owned(html)),
        Event::FootnoteReference(r) => Event::FootnoteReference(owned(r)),
        Event::SoftBreak => Event::SoftBreak,
        Event::HardBreak => Event::HardBreak,
        Event::Rule => Event::Rule,
        Event::TaskListMarker(checked) => Event::TaskListMarker(checked),
        Event::InlineMath(math) => Event::InlineMath(owned(math)),
        Event::DisplayMath(math) => Event::DisplayMath(owned(math)),
    }
}

fn tag_into_static(tag: Tag<'_>) -> Tag<'static> {
    match tag {
        Tag::Paragraph => Tag::Paragraph,
        Tag::Heading {
            level,
            id,
            classes,
            attrs,
        } => Tag::Heading {
            level,
            id: id.map(owned),
            classes: classes.into_iter().map(owned).collect(),
            attrs: attrs
                .into_iter()
                .map(|(k, v)| (owned(k), v.map(owned)))
                .collect(),
        },
        Tag::BlockQuote(kind) => Tag::BlockQuote(kind),
        Tag::CodeBlock(kind) => Tag::CodeBlock(match kind {
            CodeBlockKind::Indented => CodeBlockKind::Indented,
            CodeBlockKind::Fenced(lang) => CodeBlockKind::Fenced(owned(lang)),
        }),
        Tag::HtmlBlock => Tag::HtmlBlock,
        Tag::List(num) => Tag::List(num),
        Tag::Item => Tag::Item,
        Tag::FootnoteDefinition(label) => Tag::FootnoteDefinition(owned(label)),
        Tag::Table(alignments) => Tag::Table(alignments),
        Tag::TableHead => Tag::TableHead,
        Tag::TableRow => Tag::TableRow,
        Tag::TableCell => Tag::TableCell,
        Tag::Emphasis => Tag::Emphasis,
        Tag::Strong => Tag::Strong,
        Tag::Strikethrough => Tag::Strikethrough,
        Tag::Superscript => Tag::Superscript,
        Tag::Subscript => Tag::Subscript,
        Tag::DefinitionList => Tag::DefinitionList,
        Tag::DefinitionListTitle => Tag::DefinitionListTitle,
        Tag::DefinitionListDefinition => Tag::DefinitionListDefinition,
        Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        } => Tag::Link {
            link_type,
            dest_url: owned(dest_url),
            title: owned(title),
            id: owned(id),
        },
        Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        } => Tag::Image {
            link_type,
            dest_url: owned(dest_url),
            title: owned(title),
            id: owned(id),
        },
        Tag::MetadataBlock(kind) => Tag::MetadataBlock(kind),
    }
}

pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
