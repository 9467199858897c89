//! The type-aware traversal companion.
//!
//! [`TypeInfo`] maintains the semantic context of a document walk: the
//! active output type, parent composite type, input type, field
//! definition, and default value as stacks, plus the active directive,
//! argument, and enum value. The validation walker drives it (entering
//! before and leaving after the rule visitors), and the memoized
//! variable-usage analysis runs it over sub-trees on its own.

use arcstr::ArcStr;

use crate::{
    ast::{Field as AstField, InputValue, Operation, Type},
    schema::{
        meta::{Argument, EnumValue, Field as FieldMeta, MetaType},
        model::{DirectiveType, SchemaType},
    },
};

pub struct TypeInfo<'a> {
    schema: &'a SchemaType,
    type_stack: Vec<Option<Type<ArcStr>>>,
    parent_type_stack: Vec<Option<&'a MetaType>>,
    input_type_stack: Vec<Option<Type<ArcStr>>>,
    field_def_stack: Vec<Option<&'a FieldMeta>>,
    default_value_stack: Vec<Option<&'a InputValue>>,
    directive: Option<&'a DirectiveType>,
    argument: Option<&'a Argument>,
    enum_value: Option<&'a EnumValue>,
}

impl<'a> TypeInfo<'a> {
    /// Creates a fresh [`TypeInfo`] bound to the given schema.
    pub fn new(schema: &'a SchemaType) -> Self {
        Self {
            schema,
            type_stack: Vec::new(),
            parent_type_stack: Vec::new(),
            input_type_stack: Vec::new(),
            field_def_stack: Vec::new(),
            default_value_stack: Vec::new(),
            directive: None,
            argument: None,
            enum_value: None,
        }
    }

    // ACCESSORS

    /// The active output type literal, if known.
    pub fn get_type(&self) -> Option<&Type<ArcStr>> {
        self.type_stack.last().and_then(Option::as_ref)
    }

    /// The named type metadata behind the active output type.
    pub fn get_type_meta(&self) -> Option<&'a MetaType> {
        self.get_type()
            .and_then(|t| self.schema.concrete_type_by_name(t.innermost_name()))
    }

    /// The composite type owning the selection set being walked.
    pub fn get_parent_type(&self) -> Option<&'a MetaType> {
        self.parent_type_stack.last().copied().flatten()
    }

    /// The active input type literal, if known.
    pub fn get_input_type(&self) -> Option<&Type<ArcStr>> {
        self.input_type_stack.last().and_then(Option::as_ref)
    }

    /// The input type literal one level up, e.g. the list type while the
    /// active input type is its item type.
    pub fn get_parent_input_type(&self) -> Option<&Type<ArcStr>> {
        let len = self.input_type_stack.len();
        self.input_type_stack
            .get(len.wrapping_sub(2))
            .and_then(Option::as_ref)
    }

    /// The named type metadata behind the active input type.
    pub fn get_input_type_meta(&self) -> Option<&'a MetaType> {
        self.get_input_type()
            .and_then(|t| self.schema.concrete_type_by_name(t.innermost_name()))
    }

    /// The definition of the field being walked, if it exists.
    pub fn get_field_def(&self) -> Option<&'a FieldMeta> {
        self.field_def_stack.last().copied().flatten()
    }

    /// The default value declared for the active input position.
    pub fn get_default_value(&self) -> Option<&'a InputValue> {
        self.default_value_stack.last().copied().flatten()
    }

    /// The directive definition being walked, if it exists.
    pub fn get_directive(&self) -> Option<&'a DirectiveType> {
        self.directive
    }

    /// The argument definition being walked, if it exists.
    pub fn get_argument(&self) -> Option<&'a Argument> {
        self.argument
    }

    /// The enum value being walked, if it exists.
    pub fn get_enum_value(&self) -> Option<&'a EnumValue> {
        self.enum_value
    }

    // TRANSITIONS

    pub fn enter_operation(&mut self, operation: &Operation<'_>) {
        let root = self.schema.root_type_for(operation.operation_type);
        self.type_stack
            .push(root.map(|t| Type::NonNullNamed(ArcStr::from(t.name()))));
    }

    pub fn leave_operation(&mut self) {
        self.type_stack.pop();
    }

    pub fn enter_selection_set(&mut self) {
        self.parent_type_stack
            .push(self.get_type_meta().filter(|t| t.is_composite()));
    }

    pub fn leave_selection_set(&mut self) {
        self.parent_type_stack.pop();
    }

    pub fn enter_field(&mut self, field: &AstField<'_>) {
        let field_def = self
            .get_parent_type()
            .and_then(|parent| self.schema.lookup_field(parent, field.name.item));
        self.type_stack
            .push(field_def.map(|f| f.field_type.clone()));
        self.field_def_stack.push(field_def);
    }

    pub fn leave_field(&mut self) {
        self.field_def_stack.pop();
        self.type_stack.pop();
    }

    pub fn enter_directive(&mut self, name: &str) {
        self.directive = self.schema.directive_by_name(name);
    }

    pub fn leave_directive(&mut self) {
        self.directive = None;
    }

    /// Enters an inline fragment or a fragment definition. A missing
    /// type condition inherits the enclosing output type.
    pub fn enter_fragment(&mut self, type_condition: Option<&str>) {
        let pushed = match type_condition {
            Some(cond) => Some(Type::Named(ArcStr::from(cond))),
            None => self.get_type().cloned(),
        };
        self.type_stack.push(pushed);
    }

    pub fn leave_fragment(&mut self) {
        self.type_stack.pop();
    }

    pub fn enter_variable_definition(&mut self, var_type: &Type<&str>) {
        let is_input = self
            .schema
            .concrete_type_by_name(var_type.innermost_name())
            .is_some_and(MetaType::is_input);
        self.input_type_stack
            .push(is_input.then(|| var_type.to_arc()));
    }

    pub fn leave_variable_definition(&mut self) {
        self.input_type_stack.pop();
    }

    pub fn enter_argument(&mut self, name: &str) {
        let arg_def = match self.directive {
            Some(d) => d.arguments.iter().find(|a| a.name == name),
            None => self
                .get_field_def()
                .and_then(|f| f.argument_by_name(name)),
        };
        self.argument = arg_def;
        self.default_value_stack
            .push(arg_def.and_then(|a| a.default_value.as_ref()));
        self.input_type_stack
            .push(arg_def.map(|a| a.arg_type.clone()));
    }

    pub fn leave_argument(&mut self) {
        self.argument = None;
        self.default_value_stack.pop();
        self.input_type_stack.pop();
    }

    pub fn enter_list_value(&mut self) {
        let item_type = self
            .get_input_type()
            .cloned()
            .map(Type::into_nullable)
            .and_then(|t| t.list_contents().cloned());
        // List positions never have a default.
        self.default_value_stack.push(None);
        self.input_type_stack.push(item_type);
    }

    pub fn leave_list_value(&mut self) {
        self.default_value_stack.pop();
        self.input_type_stack.pop();
    }

    pub fn enter_object_field(&mut self, name: &str) {
        let field_def = self
            .get_input_type_meta()
            .and_then(|t| t.input_field_by_name(name));
        self.default_value_stack
            .push(field_def.and_then(|f| f.default_value.as_ref()));
        self.input_type_stack
            .push(field_def.map(|f| f.arg_type.clone()));
    }

    pub fn leave_object_field(&mut self) {
        self.default_value_stack.pop();
        self.input_type_stack.pop();
    }

    pub fn enter_enum_value(&mut self, name: &str) {
        self.enum_value = self
            .get_input_type_meta()
            .and_then(|t| t.enum_value_by_name(name));
    }

    pub fn leave_enum_value(&mut self) {
        self.enum_value = None;
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{Field as AstField, Operation, OperationType},
        span::Spanning,
        validation::test_schema,
    };

    use super::TypeInfo;

    fn field(name: &'static str) -> AstField<'static> {
        AstField {
            alias: None,
            name: Spanning::unlocated(name),
            arguments: None,
            directives: None,
            selection_set: None,
        }
    }

    #[test]
    fn tracks_output_and_parent_types_through_fields() {
        let schema = test_schema();
        let mut info = TypeInfo::new(schema);

        let op = Operation {
            operation_type: OperationType::Query,
            name: None,
            variable_definitions: None,
            directives: None,
            selection_set: vec![],
        };

        info.enter_operation(&op);
        assert_eq!(info.get_type().unwrap().innermost_name(), "QueryRoot");

        info.enter_selection_set();
        assert_eq!(info.get_parent_type().unwrap().name(), "QueryRoot");

        info.enter_field(&field("dog"));
        assert_eq!(info.get_type().unwrap().innermost_name(), "Dog");
        assert_eq!(info.get_field_def().unwrap().name, "dog");

        info.enter_selection_set();
        assert_eq!(info.get_parent_type().unwrap().name(), "Dog");

        info.enter_field(&field("__typename"));
        assert_eq!(info.get_type().unwrap().to_string(), "String!");
        info.leave_field();

        info.enter_field(&field("unknownField"));
        assert_eq!(info.get_type(), None);
        assert!(info.get_field_def().is_none());
        info.leave_field();

        info.leave_selection_set();
        info.leave_field();
        info.leave_selection_set();
        info.leave_operation();

        assert_eq!(info.get_type(), None);
        assert_eq!(info.get_parent_type(), None);
    }

    #[test]
    fn tracks_input_types_through_arguments() {
        let schema = test_schema();
        let mut info = TypeInfo::new(schema);

        let op = Operation {
            operation_type: OperationType::Query,
            name: None,
            variable_definitions: None,
            directives: None,
            selection_set: vec![],
        };

        info.enter_operation(&op);
        info.enter_selection_set();
        info.enter_field(&field("complicatedArgs"));
        info.enter_selection_set();
        info.enter_field(&field("complexArgField"));

        info.enter_argument("complexArg");
        assert_eq!(info.get_input_type().unwrap().to_string(), "ComplexInput");
        assert_eq!(info.get_argument().unwrap().name, "complexArg");

        info.enter_object_field("requiredField");
        assert_eq!(info.get_input_type().unwrap().to_string(), "Boolean!");
        assert_eq!(
            info.get_parent_input_type().unwrap().to_string(),
            "ComplexInput",
        );
        info.leave_object_field();

        info.enter_object_field("stringListField");
        assert_eq!(info.get_input_type().unwrap().to_string(), "[String]");
        info.enter_list_value();
        assert_eq!(info.get_input_type().unwrap().to_string(), "String");
        assert_eq!(info.get_default_value(), None);
        info.leave_list_value();
        info.leave_object_field();

        info.leave_argument();
        assert!(info.get_argument().is_none());
    }

    #[test]
    fn directives_take_precedence_for_argument_lookup() {
        let schema = test_schema();
        let mut info = TypeInfo::new(schema);

        info.enter_directive("skip");
        assert_eq!(info.get_directive().unwrap().name, "skip");

        info.enter_argument("if");
        assert_eq!(info.get_input_type().unwrap().to_string(), "Boolean!");
        info.leave_argument();

        info.leave_directive();
        assert!(info.get_directive().is_none());
    }
}
