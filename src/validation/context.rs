use std::{fmt, rc::Rc};

use arcstr::ArcStr;
use fnv::{FnvHashMap, FnvHashSet};

use crate::{
    ast::{
        Definition, Document, Field as AstField, Fragment, FragmentSpread, InputValue, Operation,
        Selection, Type,
    },
    schema::{
        meta::{Argument, EnumValue, Field as FieldMeta, MetaType},
        model::{DirectiveType, SchemaType},
    },
    span::{SourcePosition, Spanning},
    type_info::TypeInfo,
};

/// Query validation error.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct RuleError {
    locations: Vec<SourcePosition>,
    message: String,
}

impl RuleError {
    #[doc(hidden)]
    pub fn new(message: &str, locations: &[SourcePosition]) -> Self {
        Self {
            message: message.into(),
            locations: locations.to_vec(),
        }
    }

    /// Access the message of a validation error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Access the positions of the validation error.
    ///
    /// Some validators supply extra context through multiple positions.
    pub fn locations(&self) -> &[SourcePosition] {
        &self.locations
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let locations = self
            .locations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}. At {locations}", self.message)
    }
}

impl std::error::Error for RuleError {}

/// A variable reference somewhere under an operation or fragment, with
/// the input type and default value of the position it occurs in.
#[derive(Clone, Debug)]
pub struct VariableUsage<'a> {
    pub node: Spanning<&'a str>,
    pub input_type: Option<Type<ArcStr>>,
    pub default_value: Option<InputValue>,
}

/// The scope a variable-usage analysis runs over.
#[derive(Clone, Copy)]
pub enum DefinitionScope<'a> {
    Operation(&'a Spanning<Operation<'a>>),
    Fragment(&'a Spanning<Fragment<'a>>),
}

#[doc(hidden)]
pub struct ValidatorContext<'a> {
    pub schema: &'a SchemaType,
    pub(crate) type_info: TypeInfo<'a>,
    errors: Vec<RuleError>,
    max_errors: usize,
    aborted: bool,
    fragments: FnvHashMap<&'a str, &'a Spanning<Fragment<'a>>>,
    spreads_cache: FnvHashMap<usize, Rc<Vec<&'a Spanning<FragmentSpread<'a>>>>>,
    recursive_fragments_cache: FnvHashMap<usize, Rc<Vec<&'a Spanning<Fragment<'a>>>>>,
    usages_cache: FnvHashMap<usize, Rc<Vec<VariableUsage<'a>>>>,
}

/// Errors beyond this count are dropped and replaced with a single
/// terminal error.
pub const DEFAULT_MAX_ERRORS: usize = 100;

impl<'a> ValidatorContext<'a> {
    #[doc(hidden)]
    pub fn new(schema: &'a SchemaType, document: &'a Document<'a>) -> Self {
        Self::with_max_errors(schema, document, DEFAULT_MAX_ERRORS)
    }

    #[doc(hidden)]
    pub fn with_max_errors(
        schema: &'a SchemaType,
        document: &'a Document<'a>,
        max_errors: usize,
    ) -> Self {
        Self {
            schema,
            type_info: TypeInfo::new(schema),
            errors: Vec::new(),
            max_errors,
            aborted: false,
            fragments: document
                .iter()
                .filter_map(|def| match def {
                    Definition::Fragment(frag) => Some((frag.item.name.item, frag)),
                    _ => None,
                })
                .collect(),
            spreads_cache: FnvHashMap::default(),
            recursive_fragments_cache: FnvHashMap::default(),
            usages_cache: FnvHashMap::default(),
        }
    }

    #[doc(hidden)]
    pub fn report_error(&mut self, message: &str, locations: &[SourcePosition]) {
        if self.aborted {
            return;
        }
        if self.errors.len() >= self.max_errors {
            self.errors.push(RuleError::new(
                "Too many validation errors, error limit reached. Validation aborted.",
                &[],
            ));
            self.aborted = true;
            return;
        }
        self.errors.push(RuleError::new(message, locations));
    }

    pub(crate) fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.aborted
    }

    #[doc(hidden)]
    pub fn into_errors(mut self) -> Vec<RuleError> {
        self.errors.sort();
        self.errors
    }

    // TYPE INFO ACCESSORS

    #[doc(hidden)]
    pub fn current_type(&self) -> Option<&'a MetaType> {
        self.type_info.get_type_meta()
    }

    #[doc(hidden)]
    pub fn current_type_literal(&self) -> Option<&Type<ArcStr>> {
        self.type_info.get_type()
    }

    #[doc(hidden)]
    pub fn parent_type(&self) -> Option<&'a MetaType> {
        self.type_info.get_parent_type()
    }

    #[doc(hidden)]
    pub fn current_input_type_literal(&self) -> Option<&Type<ArcStr>> {
        self.type_info.get_input_type()
    }

    #[doc(hidden)]
    pub fn current_input_type(&self) -> Option<&'a MetaType> {
        self.type_info.get_input_type_meta()
    }

    #[doc(hidden)]
    pub fn parent_input_type_literal(&self) -> Option<&Type<ArcStr>> {
        self.type_info.get_parent_input_type()
    }

    #[doc(hidden)]
    pub fn current_field_def(&self) -> Option<&'a FieldMeta> {
        self.type_info.get_field_def()
    }

    #[doc(hidden)]
    pub fn current_directive(&self) -> Option<&'a DirectiveType> {
        self.type_info.get_directive()
    }

    #[doc(hidden)]
    pub fn current_argument(&self) -> Option<&'a Argument> {
        self.type_info.get_argument()
    }

    #[doc(hidden)]
    pub fn current_default_value(&self) -> Option<&'a InputValue> {
        self.type_info.get_default_value()
    }

    #[doc(hidden)]
    pub fn current_enum_value(&self) -> Option<&'a EnumValue> {
        self.type_info.get_enum_value()
    }

    // MEMOIZED ANALYSES
    //
    // Cache keys are node addresses; the document is immutable for the
    // lifetime of this context, so addresses are stable identities.

    #[doc(hidden)]
    pub fn fragment_by_name(&self, name: &str) -> Option<&'a Spanning<Fragment<'a>>> {
        self.fragments.get(name).copied()
    }

    #[doc(hidden)]
    pub fn is_known_fragment(&self, name: &str) -> bool {
        self.fragments.contains_key(name)
    }

    /// The direct fragment spreads of a selection set, in depth-first
    /// discovery order.
    #[doc(hidden)]
    pub fn fragment_spreads(
        &mut self,
        selection_set: &'a [Selection<'a>],
    ) -> Rc<Vec<&'a Spanning<FragmentSpread<'a>>>> {
        let key = selection_set.as_ptr() as usize;
        if let Some(cached) = self.spreads_cache.get(&key) {
            return cached.clone();
        }

        let mut spreads = Vec::new();
        let mut sets_to_visit = vec![selection_set];
        while let Some(set) = sets_to_visit.pop() {
            for selection in set {
                match selection {
                    Selection::FragmentSpread(spread) => spreads.push(spread),
                    Selection::Field(f) => {
                        if let Some(set) = &f.item.selection_set {
                            sets_to_visit.push(set);
                        }
                    }
                    Selection::InlineFragment(f) => sets_to_visit.push(&f.item.selection_set),
                }
            }
        }

        let spreads = Rc::new(spreads);
        self.spreads_cache.insert(key, spreads.clone());
        spreads
    }

    /// Every fragment reachable transitively from the operation's
    /// selection set, deduplicated by name.
    #[doc(hidden)]
    pub fn recursively_referenced_fragments(
        &mut self,
        operation: &'a Spanning<Operation<'a>>,
    ) -> Rc<Vec<&'a Spanning<Fragment<'a>>>> {
        let key = std::ptr::from_ref(operation) as usize;
        if let Some(cached) = self.recursive_fragments_cache.get(&key) {
            return cached.clone();
        }

        let mut collected_names = FnvHashSet::default();
        let mut fragments = Vec::new();
        let mut sets_to_visit: Vec<&'a [Selection<'a>]> = vec![&operation.item.selection_set];
        while let Some(set) = sets_to_visit.pop() {
            for spread in self.fragment_spreads(set).iter() {
                let name = spread.item.name.item;
                if collected_names.insert(name)
                    && let Some(&fragment) = self.fragments.get(name)
                {
                    fragments.push(fragment);
                    sets_to_visit.push(&fragment.item.selection_set);
                }
            }
        }

        let fragments = Rc::new(fragments);
        self.recursive_fragments_cache.insert(key, fragments.clone());
        fragments
    }

    /// The variable references occurring anywhere under the node, each
    /// with the input type and default value of its position. Variable
    /// definitions' own subtrees are not usages.
    #[doc(hidden)]
    pub fn variable_usages(&mut self, scope: DefinitionScope<'a>) -> Rc<Vec<VariableUsage<'a>>> {
        let key = match scope {
            DefinitionScope::Operation(op) => std::ptr::from_ref(op) as usize,
            DefinitionScope::Fragment(frag) => std::ptr::from_ref(frag) as usize,
        };
        if let Some(cached) = self.usages_cache.get(&key) {
            return cached.clone();
        }

        let mut type_info = TypeInfo::new(self.schema);
        let mut usages = Vec::new();
        match scope {
            DefinitionScope::Operation(op) => {
                type_info.enter_operation(&op.item);
                collect_directive_usages(&mut type_info, &mut usages, &op.item.directives);
                collect_selection_set_usages(&mut type_info, &mut usages, &op.item.selection_set);
                type_info.leave_operation();
            }
            DefinitionScope::Fragment(frag) => {
                type_info.enter_fragment(Some(frag.item.type_condition.item));
                collect_directive_usages(&mut type_info, &mut usages, &frag.item.directives);
                collect_selection_set_usages(&mut type_info, &mut usages, &frag.item.selection_set);
                type_info.leave_fragment();
            }
        }

        let usages = Rc::new(usages);
        self.usages_cache.insert(key, usages.clone());
        usages
    }

    /// The operation's own variable usages concatenated with those of
    /// every recursively referenced fragment.
    #[doc(hidden)]
    pub fn recursive_variable_usages(
        &mut self,
        operation: &'a Spanning<Operation<'a>>,
    ) -> Vec<VariableUsage<'a>> {
        let mut usages = self
            .variable_usages(DefinitionScope::Operation(operation))
            .as_ref()
            .clone();
        for fragment in self
            .recursively_referenced_fragments(operation)
            .iter()
            .copied()
            .collect::<Vec<_>>()
        {
            usages.extend(
                self.variable_usages(DefinitionScope::Fragment(fragment))
                    .iter()
                    .cloned(),
            );
        }
        usages
    }
}

fn collect_selection_set_usages<'a>(
    type_info: &mut TypeInfo<'a>,
    usages: &mut Vec<VariableUsage<'a>>,
    selection_set: &'a [Selection<'a>],
) {
    type_info.enter_selection_set();
    for selection in selection_set {
        match selection {
            Selection::Field(f) => {
                collect_field_usages(type_info, usages, f);
            }
            Selection::FragmentSpread(spread) => {
                collect_directive_usages(type_info, usages, &spread.item.directives);
            }
            Selection::InlineFragment(frag) => {
                type_info.enter_fragment(frag.item.type_condition.map(|tc| tc.item));
                collect_directive_usages(type_info, usages, &frag.item.directives);
                collect_selection_set_usages(type_info, usages, &frag.item.selection_set);
                type_info.leave_fragment();
            }
        }
    }
    type_info.leave_selection_set();
}

fn collect_field_usages<'a>(
    type_info: &mut TypeInfo<'a>,
    usages: &mut Vec<VariableUsage<'a>>,
    field: &'a Spanning<AstField<'a>>,
) {
    type_info.enter_field(&field.item);
    if let Some(arguments) = &field.item.arguments {
        for (name, value) in arguments.item.iter() {
            type_info.enter_argument(name.item);
            collect_value_usages(type_info, usages, value);
            type_info.leave_argument();
        }
    }
    collect_directive_usages(type_info, usages, &field.item.directives);
    if let Some(selection_set) = &field.item.selection_set {
        collect_selection_set_usages(type_info, usages, selection_set);
    }
    type_info.leave_field();
}

fn collect_directive_usages<'a>(
    type_info: &mut TypeInfo<'a>,
    usages: &mut Vec<VariableUsage<'a>>,
    directives: &'a Option<Vec<Spanning<crate::ast::Directive<'a>>>>,
) {
    let Some(directives) = directives else { return };
    for directive in directives {
        type_info.enter_directive(directive.item.name.item);
        if let Some(arguments) = &directive.item.arguments {
            for (name, value) in arguments.item.iter() {
                type_info.enter_argument(name.item);
                collect_value_usages(type_info, usages, value);
                type_info.leave_argument();
            }
        }
        type_info.leave_directive();
    }
}

fn collect_value_usages<'a>(
    type_info: &mut TypeInfo<'a>,
    usages: &mut Vec<VariableUsage<'a>>,
    value: &'a Spanning<InputValue>,
) {
    match &value.item {
        InputValue::Variable(name) => {
            usages.push(VariableUsage {
                node: Spanning::new(value.span, name.as_str()),
                input_type: type_info.get_input_type().cloned(),
                default_value: type_info.get_default_value().cloned(),
            });
        }
        InputValue::List(items) => {
            type_info.enter_list_value();
            for item in items {
                collect_value_usages(type_info, usages, item);
            }
            type_info.leave_list_value();
        }
        InputValue::Object(fields) => {
            for (name, field_value) in fields {
                type_info.enter_object_field(&name.item);
                collect_value_usages(type_info, usages, field_value);
                type_info.leave_object_field();
            }
        }
        _ => {}
    }
}
