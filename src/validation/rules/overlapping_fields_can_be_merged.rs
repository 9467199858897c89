use std::collections::HashSet;

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::{
    ast::{Arguments, Field as AstField, Selection, Type},
    schema::meta::{Field as FieldMeta, MetaType},
    span::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

/// Fields sharing a response key must be mergeable: same field name,
/// same arguments, compatible return type shapes, and recursively
/// mergeable sub-selections. Fields reachable only on mutually exclusive
/// concrete types are exempt from the name/argument checks, but their
/// return type shapes must still line up.
pub struct OverlappingFieldsCanBeMerged<'a> {
    compared_fragment_pairs: HashSet<(&'a str, &'a str, bool)>,
}

pub fn factory<'a>() -> OverlappingFieldsCanBeMerged<'a> {
    OverlappingFieldsCanBeMerged {
        compared_fragment_pairs: HashSet::new(),
    }
}

struct ConflictField<'a> {
    parent: Option<&'a MetaType>,
    field: &'a Spanning<AstField<'a>>,
    def: Option<&'a FieldMeta>,
}

type FieldMap<'a> = IndexMap<&'a str, Vec<ConflictField<'a>>>;

struct Conflict {
    reason: String,
    locations: Vec<SourcePosition>,
}

impl<'a> Visitor<'a> for OverlappingFieldsCanBeMerged<'a> {
    fn enter_selection_set(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        selection_set: &'a [Selection<'a>],
    ) {
        let parent = ctx.parent_type();
        for conflict in self.find_conflicts_within_selection_set(ctx, parent, selection_set) {
            ctx.report_error(&conflict.reason, &conflict.locations);
        }
    }
}

impl<'a> OverlappingFieldsCanBeMerged<'a> {
    fn find_conflicts_within_selection_set(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        parent: Option<&'a MetaType>,
        selection_set: &'a [Selection<'a>],
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        let (field_map, fragment_names) = collect_fields_and_fragments(ctx, parent, selection_set);

        self.collect_conflicts_within(ctx, &mut conflicts, &field_map);

        for (i, fragment_name) in fragment_names.iter().enumerate() {
            let mut visited = HashSet::new();
            self.collect_conflicts_between_fields_and_fragment(
                ctx,
                &mut conflicts,
                &field_map,
                fragment_name,
                false,
                &mut visited,
            );
            for other_name in &fragment_names[i + 1..] {
                self.collect_conflicts_between_fragments(
                    ctx,
                    &mut conflicts,
                    fragment_name,
                    other_name,
                    false,
                );
            }
        }

        conflicts
    }

    fn collect_conflicts_within(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        conflicts: &mut Vec<Conflict>,
        field_map: &FieldMap<'a>,
    ) {
        for (response_key, fields) in field_map {
            for (i, field) in fields.iter().enumerate() {
                for other in &fields[i + 1..] {
                    if let Some(conflict) =
                        self.find_conflict(ctx, response_key, field, other, false)
                    {
                        conflicts.push(conflict);
                    }
                }
            }
        }
    }

    fn collect_conflicts_between(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        conflicts: &mut Vec<Conflict>,
        field_map1: &FieldMap<'a>,
        field_map2: &FieldMap<'a>,
        mutually_exclusive: bool,
    ) {
        for (response_key, fields1) in field_map1 {
            let Some(fields2) = field_map2.get(response_key) else {
                continue;
            };
            for field1 in fields1 {
                for field2 in fields2 {
                    if let Some(conflict) =
                        self.find_conflict(ctx, response_key, field1, field2, mutually_exclusive)
                    {
                        conflicts.push(conflict);
                    }
                }
            }
        }
    }

    fn collect_conflicts_between_fields_and_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        conflicts: &mut Vec<Conflict>,
        field_map: &FieldMap<'a>,
        fragment_name: &'a str,
        mutually_exclusive: bool,
        visited: &mut HashSet<&'a str>,
    ) {
        if !visited.insert(fragment_name) {
            return;
        }
        let Some(fragment) = ctx.fragment_by_name(fragment_name) else {
            return;
        };

        let fragment_parent = ctx
            .schema
            .concrete_type_by_name(fragment.item.type_condition.item);
        let (fragment_fields, referenced) =
            collect_fields_and_fragments(ctx, fragment_parent, &fragment.item.selection_set);

        self.collect_conflicts_between(
            ctx,
            conflicts,
            field_map,
            &fragment_fields,
            mutually_exclusive,
        );

        for referenced_name in referenced {
            self.collect_conflicts_between_fields_and_fragment(
                ctx,
                conflicts,
                field_map,
                referenced_name,
                mutually_exclusive,
                visited,
            );
        }
    }

    fn collect_conflicts_between_fragments(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        conflicts: &mut Vec<Conflict>,
        fragment_name1: &'a str,
        fragment_name2: &'a str,
        mutually_exclusive: bool,
    ) {
        if fragment_name1 == fragment_name2 {
            return;
        }
        let pair = if fragment_name1 < fragment_name2 {
            (fragment_name1, fragment_name2, mutually_exclusive)
        } else {
            (fragment_name2, fragment_name1, mutually_exclusive)
        };
        if !self.compared_fragment_pairs.insert(pair) {
            return;
        }

        let (Some(fragment1), Some(fragment2)) = (
            ctx.fragment_by_name(fragment_name1),
            ctx.fragment_by_name(fragment_name2),
        ) else {
            return;
        };

        let parent1 = ctx
            .schema
            .concrete_type_by_name(fragment1.item.type_condition.item);
        let parent2 = ctx
            .schema
            .concrete_type_by_name(fragment2.item.type_condition.item);
        let (fields1, referenced1) =
            collect_fields_and_fragments(ctx, parent1, &fragment1.item.selection_set);
        let (fields2, referenced2) =
            collect_fields_and_fragments(ctx, parent2, &fragment2.item.selection_set);

        self.collect_conflicts_between(ctx, conflicts, &fields1, &fields2, mutually_exclusive);

        for referenced in referenced2 {
            self.collect_conflicts_between_fragments(
                ctx,
                conflicts,
                fragment_name1,
                referenced,
                mutually_exclusive,
            );
        }
        for referenced in referenced1 {
            self.collect_conflicts_between_fragments(
                ctx,
                conflicts,
                referenced,
                fragment_name2,
                mutually_exclusive,
            );
        }
    }

    fn find_conflict(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        response_key: &str,
        field1: &ConflictField<'a>,
        field2: &ConflictField<'a>,
        parents_mutually_exclusive: bool,
    ) -> Option<Conflict> {
        // Two concrete object parents can never both apply to one value,
        // so their fields may differ; the response shapes still have to
        // line up.
        let mutually_exclusive = parents_mutually_exclusive
            || match (field1.parent, field2.parent) {
                (Some(p1), Some(p2)) => {
                    !std::ptr::eq(p1, p2)
                        && matches!(p1, MetaType::Object(..))
                        && matches!(p2, MetaType::Object(..))
                }
                _ => false,
            };

        if !mutually_exclusive {
            let name1 = field1.field.item.name.item;
            let name2 = field2.field.item.name.item;
            if name1 != name2 {
                return Some(self.conflict(
                    response_key,
                    format!("\"{name1}\" and \"{name2}\" are different fields"),
                    field1,
                    field2,
                ));
            }

            if !same_arguments(&field1.field.item.arguments, &field2.field.item.arguments) {
                return Some(self.conflict(
                    response_key,
                    "they have differing arguments".into(),
                    field1,
                    field2,
                ));
            }
        }

        if let (Some(def1), Some(def2)) = (field1.def, field2.def)
            && do_types_conflict(ctx, &def1.field_type, &def2.field_type)
        {
            return Some(self.conflict(
                response_key,
                format!(
                    "they return conflicting types \"{}\" and \"{}\"",
                    def1.field_type, def2.field_type,
                ),
                field1,
                field2,
            ));
        }

        if let (Some(set1), Some(set2)) = (
            &field1.field.item.selection_set,
            &field2.field.item.selection_set,
        ) {
            let parent1 = field1
                .def
                .and_then(|d| ctx.schema.concrete_type_by_name(d.field_type.innermost_name()));
            let parent2 = field2
                .def
                .and_then(|d| ctx.schema.concrete_type_by_name(d.field_type.innermost_name()));
            let sub_conflicts = self.find_conflicts_between_sub_selection_sets(
                ctx,
                mutually_exclusive,
                parent1,
                set1,
                parent2,
                set2,
            );
            if let Some(sub) = sub_conflicts.into_iter().next() {
                return Some(Conflict {
                    reason: format!(
                        "Fields \"{response_key}\" conflict because {}. Use different aliases \
                         on the fields to fetch both if this was intentional.",
                        nested_reason(&sub.reason),
                    ),
                    locations: {
                        let mut locations = vec![field1.field.start(), field2.field.start()];
                        locations.extend(sub.locations);
                        locations
                    },
                });
            }
        }

        None
    }

    fn find_conflicts_between_sub_selection_sets(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        mutually_exclusive: bool,
        parent1: Option<&'a MetaType>,
        set1: &'a [Selection<'a>],
        parent2: Option<&'a MetaType>,
        set2: &'a [Selection<'a>],
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        let (fields1, fragments1) = collect_fields_and_fragments(ctx, parent1, set1);
        let (fields2, fragments2) = collect_fields_and_fragments(ctx, parent2, set2);

        self.collect_conflicts_between(ctx, &mut conflicts, &fields1, &fields2, mutually_exclusive);

        for fragment_name in &fragments2 {
            let mut visited = HashSet::new();
            self.collect_conflicts_between_fields_and_fragment(
                ctx,
                &mut conflicts,
                &fields1,
                fragment_name,
                mutually_exclusive,
                &mut visited,
            );
        }
        for fragment_name in &fragments1 {
            let mut visited = HashSet::new();
            self.collect_conflicts_between_fields_and_fragment(
                ctx,
                &mut conflicts,
                &fields2,
                fragment_name,
                mutually_exclusive,
                &mut visited,
            );
        }
        for fragment_name1 in &fragments1 {
            for fragment_name2 in &fragments2 {
                self.collect_conflicts_between_fragments(
                    ctx,
                    &mut conflicts,
                    fragment_name1,
                    fragment_name2,
                    mutually_exclusive,
                );
            }
        }

        conflicts
    }

    fn conflict(
        &self,
        response_key: &str,
        reason: String,
        field1: &ConflictField<'a>,
        field2: &ConflictField<'a>,
    ) -> Conflict {
        Conflict {
            reason: format!(
                "Fields \"{response_key}\" conflict because {reason}. Use different aliases \
                 on the fields to fetch both if this was intentional.",
            ),
            locations: vec![field1.field.start(), field2.field.start()],
        }
    }
}

/// Strips the leading `Fields "x" conflict because ` and trailing advice
/// when nesting a sub-conflict reason into its parent message.
fn nested_reason(full_message: &str) -> String {
    let stripped = full_message
        .strip_suffix(
            ". Use different aliases on the fields to fetch both if this was intentional.",
        )
        .unwrap_or(full_message);
    match stripped.split_once(" conflict because ") {
        Some((key_part, reason)) => format!("subfields {} conflict because {reason}",
            key_part.trim_start_matches("Fields ")),
        None => stripped.into(),
    }
}

fn collect_fields_and_fragments<'a>(
    ctx: &mut ValidatorContext<'a>,
    parent: Option<&'a MetaType>,
    selection_set: &'a [Selection<'a>],
) -> (FieldMap<'a>, Vec<&'a str>) {
    let mut field_map = FieldMap::new();
    let mut fragment_names = Vec::new();
    collect_into(ctx, parent, selection_set, &mut field_map, &mut fragment_names);
    (field_map, fragment_names)
}

fn collect_into<'a>(
    ctx: &mut ValidatorContext<'a>,
    parent: Option<&'a MetaType>,
    selection_set: &'a [Selection<'a>],
    field_map: &mut FieldMap<'a>,
    fragment_names: &mut Vec<&'a str>,
) {
    for selection in selection_set {
        match selection {
            Selection::Field(f) => {
                let def = parent.and_then(|p| p.field_by_name(f.item.name.item));
                field_map
                    .entry(f.item.response_key())
                    .or_default()
                    .push(ConflictField {
                        parent,
                        field: f,
                        def,
                    });
            }
            Selection::FragmentSpread(spread) => {
                if !fragment_names.contains(&spread.item.name.item) {
                    fragment_names.push(spread.item.name.item);
                }
            }
            Selection::InlineFragment(frag) => {
                let frag_parent = frag
                    .item
                    .type_condition
                    .and_then(|cond| ctx.schema.concrete_type_by_name(cond.item))
                    .or(parent);
                collect_into(
                    ctx,
                    frag_parent,
                    &frag.item.selection_set,
                    field_map,
                    fragment_names,
                );
            }
        }
    }
}

fn same_arguments(
    args1: &Option<Spanning<Arguments<'_>>>,
    args2: &Option<Spanning<Arguments<'_>>>,
) -> bool {
    let empty = [];
    let items1 = args1.as_ref().map_or(&empty[..], |a| &a.item.items);
    let items2 = args2.as_ref().map_or(&empty[..], |a| &a.item.items);

    if items1.len() != items2.len() {
        return false;
    }
    items1.iter().all(|(name1, value1)| {
        items2
            .iter()
            .find(|(name2, _)| name1.item == name2.item)
            .is_some_and(|(_, value2)| value1.item.unlocated_eq(&value2.item))
    })
}

/// Whether two return types cannot both shape the same response
/// position: list/non-list or null/non-null mismatches always conflict,
/// and differing leaf types conflict.
fn do_types_conflict(ctx: &ValidatorContext<'_>, t1: &Type<ArcStr>, t2: &Type<ArcStr>) -> bool {
    match (t1.is_non_null(), t2.is_non_null()) {
        (true, true) => {
            return do_types_conflict(
                ctx,
                &t1.clone().into_nullable(),
                &t2.clone().into_nullable(),
            );
        }
        (true, false) | (false, true) => return true,
        (false, false) => {}
    }

    match (t1.list_contents(), t2.list_contents()) {
        (Some(inner1), Some(inner2)) => return do_types_conflict(ctx, inner1, inner2),
        (Some(..), None) | (None, Some(..)) => return true,
        (None, None) => {}
    }

    let name1 = t1.innermost_name();
    let name2 = t2.innermost_name();
    let meta1 = ctx.schema.concrete_type_by_name(name1);
    let meta2 = ctx.schema.concrete_type_by_name(name2);
    match (meta1, meta2) {
        (Some(m1), Some(m2)) if m1.is_leaf() || m2.is_leaf() => name1 != name2,
        _ => false,
    }
}
