//! Formatter source template.

use crate::info::{MemberSerializationInfo, ObjectSerializationInfo};
use formatgen_resolver::TARGET_MARKER;

/// Template rendering one Utf8Json `IJsonFormatter<T>` per object info.
#[derive(Debug, Clone)]
pub struct FormatterTemplate {
    /// Namespace the formatters are declared in.
    pub namespace: String,
    /// Types to render formatters for.
    pub object_infos: Vec<ObjectSerializationInfo>,
}

impl FormatterTemplate {
    /// Creates a new template.
    #[must_use]
    pub fn new(namespace: impl Into<String>, object_infos: Vec<ObjectSerializationInfo>) -> Self {
        Self {
            namespace: namespace.into(),
            object_infos,
        }
    }

    /// Renders the full source unit.
    #[must_use]
    pub fn transform_text(&self) -> String {
        let mut output = String::new();

        output.push_str("// <auto-generated>\n");
        output.push_str("// Generated by formatgen. Do not edit.\n");
        output.push_str("// </auto-generated>\n");
        for info in &self.object_infos {
            output.push_str(&format!("{}{}\n", TARGET_MARKER, info.target()));
        }
        output.push('\n');
        for warning in [618, 612, 414, 219, 168] {
            output.push_str(&format!("#pragma warning disable {warning}\n"));
        }
        output.push('\n');

        output.push_str(&format!("namespace {}\n{{\n", self.namespace));
        output.push_str("    using System;\n");
        output.push_str("    using Utf8Json;\n\n");

        for info in &self.object_infos {
            output.push_str(&Self::generate_formatter(info));
        }

        output.push_str("}\n\n");
        for warning in [618, 612, 414, 219, 168] {
            output.push_str(&format!("#pragma warning restore {warning}\n"));
        }

        output
    }

    fn generate_formatter(info: &ObjectSerializationInfo) -> String {
        let mut output = String::new();
        let target = info.qualified_name();
        let formatter = info.formatter_name();

        output.push_str(&format!(
            "    public sealed class {formatter} : global::Utf8Json.IJsonFormatter<{target}>\n"
        ));
        output.push_str("    {\n");
        output.push_str("        readonly global::Utf8Json.Internal.AutomataDictionary ____keyMapping;\n");
        output.push_str("        readonly byte[][] ____stringByteKeys;\n\n");

        output.push_str(&Self::generate_constructor(&formatter, &info.members));
        output.push_str(&Self::generate_serialize(info, &target));
        output.push_str(&Self::generate_deserialize(info, &target));

        output.push_str("    }\n\n");
        output
    }

    fn generate_constructor(formatter: &str, members: &[MemberSerializationInfo]) -> String {
        let mut output = String::new();

        output.push_str(&format!("        public {formatter}()\n"));
        output.push_str("        {\n");
        output.push_str("            this.____keyMapping = new global::Utf8Json.Internal.AutomataDictionary()\n");
        output.push_str("            {\n");
        for (i, member) in members.iter().enumerate() {
            output.push_str(&format!(
                "                {{ JsonWriter.GetEncodedPropertyNameWithoutQuotation(\"{}\"), {} }},\n",
                member.name, i
            ));
        }
        output.push_str("            };\n\n");

        // Serialize indexes these keys, so they follow the readable members.
        let readable: Vec<&MemberSerializationInfo> =
            members.iter().filter(|m| m.is_readable).collect();
        if readable.is_empty() {
            output.push_str("            this.____stringByteKeys = new byte[0][];\n");
        } else {
            output.push_str("            this.____stringByteKeys = new byte[][]\n");
            output.push_str("            {\n");
            for (i, member) in readable.iter().enumerate() {
                let encoder = if i == 0 {
                    "GetEncodedPropertyNameWithBeginObject"
                } else {
                    "GetEncodedPropertyNameWithPrefixValueSeparator"
                };
                output.push_str(&format!(
                    "                JsonWriter.{}(\"{}\"),\n",
                    encoder, member.name
                ));
            }
            output.push_str("            };\n");
        }
        output.push_str("        }\n\n");

        output
    }

    fn generate_serialize(info: &ObjectSerializationInfo, target: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "        public void Serialize(ref JsonWriter writer, {target} value, global::Utf8Json.IJsonFormatterResolver formatterResolver)\n"
        ));
        output.push_str("        {\n");
        if info.is_class {
            output.push_str("            if (value == null)\n");
            output.push_str("            {\n");
            output.push_str("                writer.WriteNull();\n");
            output.push_str("                return;\n");
            output.push_str("            }\n\n");
        }

        if !info.members.iter().any(|m| m.is_readable) {
            output.push_str("            writer.WriteBeginObject();\n");
        }
        for (i, member) in info.members.iter().filter(|m| m.is_readable).enumerate() {
            output.push_str(&format!(
                "            writer.WriteRaw(this.____stringByteKeys[{i}]);\n"
            ));
            output.push_str(&format!("            {};\n", member.serialize_call()));
        }
        output.push_str("            writer.WriteEndObject();\n");
        output.push_str("        }\n\n");

        output
    }

    fn generate_deserialize(info: &ObjectSerializationInfo, target: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "        public {target} Deserialize(ref JsonReader reader, global::Utf8Json.IJsonFormatterResolver formatterResolver)\n"
        ));
        output.push_str("        {\n");
        output.push_str("            if (reader.ReadIsNull())\n");
        output.push_str("            {\n");
        if info.is_class {
            output.push_str("                return null;\n");
        } else {
            output.push_str(
                "                throw new InvalidOperationException(\"typecode is null, struct not supported\");\n",
            );
        }
        output.push_str("            }\n\n");

        for member in &info.members {
            output.push_str(&format!(
                "            var __{0}__ = default({1});\n            var __{0}__b__ = false;\n",
                member.member_name, member.type_label
            ));
        }
        if !info.members.is_empty() {
            output.push('\n');
        }

        output.push_str("            var ____count = 0;\n");
        output.push_str("            reader.ReadIsBeginObjectWithVerify();\n");
        output.push_str("            while (!reader.ReadIsEndObjectWithSkipValueSeparator(ref ____count))\n");
        output.push_str("            {\n");
        output.push_str("                var stringKey = reader.ReadPropertyNameSegmentRaw();\n");
        output.push_str("                int key;\n");
        output.push_str("                if (!____keyMapping.TryGetValueSafe(stringKey, out key))\n");
        output.push_str("                {\n");
        output.push_str("                    reader.ReadNextBlock();\n");
        output.push_str("                    goto NEXT_LOOP;\n");
        output.push_str("                }\n\n");
        output.push_str("                switch (key)\n");
        output.push_str("                {\n");
        for (i, member) in info.members.iter().enumerate() {
            output.push_str(&format!("                    case {i}:\n"));
            output.push_str(&format!(
                "                        __{}__ = {};\n",
                member.member_name,
                member.deserialize_call()
            ));
            output.push_str(&format!(
                "                        __{}__b__ = true;\n",
                member.member_name
            ));
            output.push_str("                        break;\n");
        }
        output.push_str("                    default:\n");
        output.push_str("                        reader.ReadNextBlock();\n");
        output.push_str("                        break;\n");
        output.push_str("                }\n\n");
        output.push_str("                NEXT_LOOP:\n");
        output.push_str("                continue;\n");
        output.push_str("            }\n\n");

        output.push_str(&format!(
            "            var ____result = {};\n",
            Self::construct(info, target)
        ));
        for member in info.members.iter().filter(|m| m.is_writable) {
            output.push_str(&format!(
                "            if (__{0}__b__) ____result.{0} = __{0}__;\n",
                member.member_name
            ));
        }
        output.push('\n');
        output.push_str("            return ____result;\n");
        output.push_str("        }\n");

        output
    }

    fn construct(info: &ObjectSerializationInfo, target: &str) -> String {
        if info.has_constructor {
            format!("new {target}()")
        } else if info.is_class {
            format!(
                "({target})global::System.Runtime.Serialization.FormatterServices.GetUninitializedObject(typeof({target}))"
            )
        } else {
            format!("default({target})")
        }
    }
}
