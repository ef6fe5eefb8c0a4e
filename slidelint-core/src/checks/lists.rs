use super::{list_examples, Verdict};
use crate::types::{ListType, Paragraph, Slide};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListConsistencyParams {
    #[serde(default = "default_true")]
    pub same_type: bool,
}

impl Default for ListConsistencyParams {
    fn default() -> Self {
        Self { same_type: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListNestingParams {
    pub max_level: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListItemsCountParams {
    pub min_items: usize,
    pub max_items: usize,
    pub check_bullet: bool,
    pub check_numbered: bool,
    /// Count items below level 0 as lists of their own
    pub check_nested: bool,
}

impl Default for ListItemsCountParams {
    fn default() -> Self {
        Self {
            min_items: 1,
            max_items: 8,
            check_bullet: true,
            check_numbered: true,
            check_nested: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NestedListsDepthParams {
    pub max_depth: u32,
    pub check_bullet: bool,
    pub check_numbered: bool,
}

impl Default for NestedListsDepthParams {
    fn default() -> Self {
        Self {
            max_depth: 2,
            check_bullet: true,
            check_numbered: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixedListsParams {
    pub allow_mixed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConsistencyParams {
    /// All items open with the same word
    pub check_parallelism: bool,
    /// No item ends with `.`, `,` or `;`
    pub check_punctuation: bool,
}

impl Default for BulletConsistencyParams {
    fn default() -> Self {
        Self {
            check_parallelism: true,
            check_punctuation: true,
        }
    }
}

/// Whether a list item's type is selected by the bullet/ordered switches
fn selected(list_type: ListType, check_bullet: bool, check_numbered: bool) -> bool {
    match list_type {
        ListType::None => false,
        ListType::Bullet => check_bullet,
        _ => check_numbered,
    }
}

fn type_labels(types: &BTreeSet<ListType>) -> String {
    types.iter().map(|t| t.label()).collect::<Vec<_>>().join(", ")
}

pub fn list_consistency<'a>(
    params: &ListConsistencyParams,
    items: impl Iterator<Item = &'a Paragraph>,
) -> Verdict {
    if !params.same_type {
        return Verdict::pass("list consistency check disabled");
    }

    let types: BTreeSet<ListType> = items.map(|item| item.list_type).collect();
    match types.len() {
        0 => Verdict::pass("no lists to check"),
        1 => Verdict::pass(format!("all lists are {}", type_labels(&types))),
        _ => Verdict::fail(format!("different list types are used: {}", type_labels(&types))),
    }
}

pub fn list_nesting(params: &ListNestingParams, slide: &Slide) -> Verdict {
    let Some(deepest) = slide.list_items().map(|item| item.level).max() else {
        return Verdict::pass("no lists to check");
    };

    match params.max_level {
        Some(max) if deepest > max => {
            Verdict::fail(format!("list nesting level {}, maximum is {}", deepest, max))
        }
        _ => Verdict::pass(format!("list nesting level {} within limits", deepest)),
    }
}

/// One run of consecutive same-type, same-level list items
#[derive(Debug, Clone, PartialEq, Eq)]
struct ListRun {
    list_type: ListType,
    level: u32,
    /// 1-based position of the first item among the slide's blocks
    start: usize,
    items: usize,
}

/// Plain paragraphs end the current list. Items filtered out by type or
/// nesting are skipped without ending it.
fn find_lists(slide: &Slide, params: &ListItemsCountParams) -> Vec<ListRun> {
    let mut lists = Vec::new();
    let mut current: Option<ListRun> = None;

    for (i, block) in slide.blocks.iter().enumerate() {
        if block.list_type == ListType::None {
            lists.extend(current.take());
            continue;
        }
        if !selected(block.list_type, params.check_bullet, params.check_numbered) {
            continue;
        }
        if !params.check_nested && block.level > 0 {
            continue;
        }

        match current.as_mut() {
            Some(run) if run.list_type == block.list_type && run.level == block.level => {
                run.items += 1;
            }
            _ => {
                lists.extend(current.replace(ListRun {
                    list_type: block.list_type,
                    level: block.level,
                    start: i + 1,
                    items: 1,
                }));
            }
        }
    }

    lists.extend(current);
    lists
}

pub fn list_items_count(params: &ListItemsCountParams, slide: &Slide) -> Verdict {
    let lists = find_lists(slide, params);
    if lists.is_empty() {
        return Verdict::pass("no lists found");
    }

    let mut issues = Vec::new();
    for list in &lists {
        if list.items < params.min_items {
            issues.push(format!(
                "{} list at block {}: {} item(s), minimum {}",
                list.list_type.label(),
                list.start,
                list.items,
                params.min_items
            ));
        }
        if list.items > params.max_items {
            issues.push(format!(
                "{} list at block {}: {} items, maximum {}",
                list.list_type.label(),
                list.start,
                list.items,
                params.max_items
            ));
        }
    }

    if issues.is_empty() {
        Verdict::pass("list item counts within limits")
    } else {
        Verdict::fail(list_examples(&issues))
    }
}

pub fn nested_lists_depth(params: &NestedListsDepthParams, slide: &Slide) -> Verdict {
    let mut deepest = 0;
    let mut too_deep = Vec::new();

    for (i, block) in slide.blocks.iter().enumerate() {
        if !selected(block.list_type, params.check_bullet, params.check_numbered) {
            continue;
        }
        deepest = deepest.max(block.level);
        if block.level > params.max_depth {
            too_deep.push(format!(
                "{} item at block {} (level {})",
                block.list_type.label(),
                i + 1,
                block.level
            ));
        }
    }

    if too_deep.is_empty() {
        Verdict::pass(format!("list depth within limits (deepest {})", deepest))
    } else {
        Verdict::fail(format!(
            "list depth exceeds {}: {}",
            params.max_depth,
            list_examples(&too_deep)
        ))
    }
}

pub fn mixed_lists(params: &MixedListsParams, slide: &Slide) -> Verdict {
    if params.allow_mixed {
        return Verdict::pass("mixed lists allowed");
    }

    let types: BTreeSet<ListType> = slide.list_items().map(|item| item.list_type).collect();
    if types.len() > 1 {
        Verdict::fail(format!("different list types are mixed: {}", type_labels(&types)))
    } else {
        Verdict::pass("list types are consistent")
    }
}

pub fn bullet_consistency(params: &BulletConsistencyParams, slide: &Slide) -> Verdict {
    let items: Vec<&Paragraph> = slide.list_items().collect();
    if items.is_empty() {
        return Verdict::pass("no list items");
    }

    let mut issues = Vec::new();

    if params.check_parallelism {
        let first_words: BTreeSet<String> = items
            .iter()
            .map(|item| {
                item.text
                    .split_whitespace()
                    .next()
                    .unwrap_or("")
                    .to_lowercase()
            })
            .collect();
        if first_words.len() > 1 {
            issues.push("list items start with different words".to_string());
        }
    }

    if params.check_punctuation {
        let endings: BTreeSet<char> = items
            .iter()
            .filter_map(|item| item.text.trim().chars().last())
            .collect();
        for (mark, name) in [('.', "a period"), (',', "a comma"), (';', "a semicolon")] {
            if endings.contains(&mark) {
                issues.push(format!("list items should not end with {}", name));
            }
        }
    }

    if issues.is_empty() {
        Verdict::pass("list items are consistent")
    } else {
        Verdict::fail(list_examples(&issues))
    }
}
