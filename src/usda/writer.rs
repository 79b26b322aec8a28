//! Stable `.usda` serializer.
//!
//! Output is deterministic: entries keep their authored order, time samples
//! are written in increasing time order, and every float is written in its
//! shortest round-trip form. Reparsing the output yields an equal layer.

use super::format::{fmt_f64, fmt_key, fmt_value, quote};
use crate::core::{Attribute, DictValue, Dictionary, MetaData, MetaValue, SdfPath, Variability};
use crate::layer::{Layer, Prim, Property, Relationship};

const INDENT: &str = "    ";

/// Serialize a layer to `.usda` text.
pub fn serialize(layer: &Layer) -> String {
    let mut writer = UsdaWriter::default();
    writer.layer(layer);
    writer.out
}

#[derive(Default)]
struct UsdaWriter {
    out: String,
    depth: usize,
}

impl UsdaWriter {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn layer(&mut self, layer: &Layer) {
        self.line(&format!("#usda {}", layer.version()));
        if !layer.metadata().is_empty() {
            self.line("(");
            self.metadata_entries(layer.metadata());
            self.line(")");
        }
        for prim in layer.prims() {
            self.blank();
            self.prim(prim);
        }
    }

    /// Write `head`, followed by a `( ... )` block when `meta` is non-empty.
    fn with_metadata(&mut self, head: &str, meta: &MetaData) {
        if meta.is_empty() {
            self.line(head);
        } else {
            self.line(&format!("{head} ("));
            self.metadata_entries(meta);
            self.line(")");
        }
    }

    fn metadata_entries(&mut self, meta: &MetaData) {
        self.depth += 1;
        for entry in meta.iter() {
            let value = fmt_meta(&entry.value, self.depth);
            match entry.op {
                Some(op) => self.line(&format!("{} {} = {value}", op.as_str(), entry.key)),
                None => self.line(&format!("{} = {value}", entry.key)),
            }
        }
        self.depth -= 1;
    }

    fn prim(&mut self, prim: &Prim) {
        let mut head = format!("{} ", prim.specifier().as_str());
        if let Some(type_name) = prim.type_name() {
            head.push_str(type_name);
            head.push(' ');
        }
        head.push_str(&quote(prim.name()));
        self.with_metadata(&head, prim.metadata());

        self.line("{");
        self.depth += 1;
        for property in prim.properties() {
            match property {
                Property::Attribute(attr) => self.attribute(attr),
                Property::Relationship(rel) => self.relationship(rel),
            }
        }
        for (i, child) in prim.children().iter().enumerate() {
            if i > 0 || !prim.properties().is_empty() {
                self.blank();
            }
            self.prim(child);
        }
        self.depth -= 1;
        self.line("}");
    }

    fn attribute(&mut self, attr: &Attribute) {
        let mut decl = String::new();
        if attr.is_custom() {
            decl.push_str("custom ");
        }
        if attr.variability() == Variability::Uniform {
            decl.push_str("uniform ");
        }
        decl.push_str(&format!("{} {}", attr.value_type(), attr.name()));

        // the plain declaration line carries the default and all metadata
        let bare = attr.time_samples().is_none() && attr.connections().is_empty();
        if attr.default_value().is_some() || !attr.metadata().is_empty() || bare {
            let head = match attr.default_value() {
                Some(value) => format!("{decl} = {}", fmt_value(value)),
                None => decl.clone(),
            };
            self.with_metadata(&head, attr.metadata());
        }

        if let Some(samples) = attr.time_samples() {
            self.line(&format!("{decl}.timeSamples = {{"));
            self.depth += 1;
            for (time, value) in samples.iter() {
                self.line(&format!("{time}: {},", fmt_value(value)));
            }
            self.depth -= 1;
            self.line("}");
        }

        if !attr.connections().is_empty() {
            self.line(&format!("{decl}.connect = {}", fmt_targets(attr.connections())));
        }
    }

    fn relationship(&mut self, rel: &Relationship) {
        let mut head = String::new();
        if let Some(op) = rel.op() {
            head.push_str(op.as_str());
            head.push(' ');
        }
        if rel.is_custom() {
            head.push_str("custom ");
        }
        head.push_str("rel ");
        head.push_str(rel.name());
        if let Some(targets) = rel.targets() {
            head.push_str(" = ");
            head.push_str(&fmt_targets(targets));
        }
        self.with_metadata(&head, rel.metadata());
    }
}

fn fmt_targets(targets: &[SdfPath]) -> String {
    match targets {
        [] => "None".to_string(),
        [single] => format!("<{single}>"),
        many => {
            let parts: Vec<String> = many.iter().map(|p| format!("<{p}>")).collect();
            format!("[{}]", parts.join(", "))
        }
    }
}

fn pad(depth: usize) -> String {
    INDENT.repeat(depth)
}

/// Format a metadata value written at nesting `depth`.
fn fmt_meta(value: &MetaValue, depth: usize) -> String {
    match value {
        MetaValue::Number(v) => fmt_f64(*v),
        MetaValue::String(s) => quote(s),
        MetaValue::Ident(word) => word.clone(),
        MetaValue::Asset(path) => format!("@{path}@"),
        MetaValue::Reference { asset, prim } => format!("@{asset}@<{prim}>"),
        MetaValue::Path(path) => format!("<{path}>"),
        MetaValue::List(items) => {
            let parts: Vec<String> = items.iter().map(|v| fmt_meta(v, depth)).collect();
            format!("[{}]", parts.join(", "))
        }
        MetaValue::Tuple(items) => {
            let parts: Vec<String> = items.iter().map(|v| fmt_meta(v, depth)).collect();
            format!("({})", parts.join(", "))
        }
        MetaValue::Dictionary(dict) => fmt_dict(dict, depth),
    }
}

fn fmt_dict(dict: &Dictionary, depth: usize) -> String {
    let mut out = String::from("{\n");
    for (key, value) in dict.iter() {
        out.push_str(&pad(depth + 1));
        match value {
            DictValue::Typed { ty, value } => {
                out.push_str(&format!("{ty} {} = {}", fmt_key(key), fmt_value(value)));
            }
            DictValue::Dictionary(nested) => {
                out.push_str(&format!("dictionary {} = {}", fmt_key(key), fmt_dict(nested, depth + 1)));
            }
        }
        out.push('\n');
    }
    out.push_str(&pad(depth));
    out.push('}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ListOp, MetaEntry, TimeCode};
    use crate::layer::Specifier;
    use crate::usda::parse;
    use crate::util::{BaseType, DMat4, DVec2, DVec3, DVec4, Storage, Value, ValueType, Vec2, Vec3, Vec4};

    fn scene() -> Layer {
        let mut capture = Dictionary::new();
        capture.insert("capture_frame_end", DictValue::Typed { ty: ValueType::INT, value: Value::Int(31) });
        let mut data = Dictionary::new();
        data.insert("MovieCaptureSettings", DictValue::Dictionary(capture));

        let mut meta = MetaData::new();
        meta.set("startTimeCode", MetaValue::Number(1.0));
        meta.set("endTimeCode", MetaValue::Number(31.0));
        meta.set("customLayerData", MetaValue::Dictionary(data));

        let mut prim_meta = MetaData::new();
        prim_meta.push(MetaEntry {
            op: Some(ListOp::Prepend),
            key: "apiSchemas".into(),
            value: MetaValue::List(vec![MetaValue::String("ShapingAPI".into())]),
        });

        let intensity = Attribute::sampled(
            "inputs:intensity",
            ValueType::FLOAT,
            [(TimeCode::from(11), Value::Float(1000.0)), (TimeCode::from(1), Value::Float(1.0))],
        )
        .unwrap();
        let light = Prim::def("RectLight", "rect_light")
            .unwrap()
            .with_metadata(prim_meta)
            .with_property(intensity)
            .with_property(Relationship::new("light:filters", Vec::<SdfPath>::new()).unwrap());
        Layer::new()
            .with_metadata(meta)
            .with_prim(Prim::def("Scope", "lights").unwrap().with_child(light))
    }

    #[test]
    fn test_serialize_text() {
        let expected = r#"#usda 1.0
(
    startTimeCode = 1
    endTimeCode = 31
    customLayerData = {
        dictionary MovieCaptureSettings = {
            int capture_frame_end = 31
        }
    }
)

def Scope "lights"
{
    def RectLight "rect_light" (
        prepend apiSchemas = ["ShapingAPI"]
    )
    {
        float inputs:intensity.timeSamples = {
            1: 1,
            11: 1000,
        }
        rel light:filters = None
    }
}
"#;
        assert_eq!(serialize(&scene()), expected);
    }

    #[test]
    fn test_round_trip() {
        let layer = scene();
        let text = serialize(&layer);
        let back = parse(&text).unwrap();
        assert_eq!(back, layer);
        assert_eq!(serialize(&back), text);
    }

    /// Extreme but finite-or-infinite value for each storage kind.
    fn edge_value(base: BaseType) -> Value {
        match base.storage() {
            Storage::Bool => Value::Bool(true),
            Storage::Int => Value::Int(i32::MIN),
            Storage::UInt => Value::UInt(u32::MAX),
            Storage::Int64 => Value::Int64(i64::MIN),
            Storage::Float => Value::Float(f32::MAX),
            Storage::Double => Value::Double(f64::MIN_POSITIVE),
            Storage::Float2 => Value::Float2(Vec2::new(f32::MIN_POSITIVE, -0.1)),
            Storage::Float3 => Value::Float3(Vec3::new(f32::INFINITY, 1e-7, -3.5)),
            Storage::Float4 => Value::Float4(Vec4::new(0.1, 0.2, 0.3, f32::NEG_INFINITY)),
            Storage::Double2 => Value::Double2(DVec2::new(f64::MAX, f64::MIN)),
            Storage::Double3 => Value::Double3(DVec3::new(5e-324, -1e300, f64::INFINITY)),
            Storage::Double4 => Value::Double4(DVec4::new(0.1, -0.0, 1.0 / 3.0, 6500.0)),
            Storage::Matrix4d => Value::Matrix4d(DMat4::from_cols_array(&[
                0.1, 0.2, 0.3, 0.0, -1.0, 1e-12, 2.5, 0.0, 0.0, 0.0, 1.0, 0.0, 10.0, -20.0, 30.5, 1.0,
            ])),
            Storage::Token => Value::Token("xformOp:rotateXYZ".into()),
            Storage::String => Value::String("say \"hi\"\n\tbye".into()),
            Storage::Asset => Value::Asset("./ies/test light.ies".into()),
        }
    }

    #[test]
    fn test_round_trip_every_type() {
        let mut prim = Prim::def("Scope", "values").unwrap();
        for base in BaseType::ALL {
            let value = edge_value(base);
            let scalar = Attribute::constant(format!("inputs:{base}"), ValueType::scalar(base), value.clone()).unwrap();
            let array = Attribute::sampled(
                format!("inputs:{base}_array"),
                ValueType::array(base),
                [
                    (TimeCode::from(1), Value::Array(vec![value.clone(), value])),
                    (TimeCode::from(2), Value::Array(Vec::new())),
                ],
            )
            .unwrap();
            prim = prim.with_property(scalar).with_property(array);
        }
        let layer = Layer::new().with_prim(prim);
        let text = serialize(&layer);
        let back = parse(&text).unwrap();
        assert_eq!(back, layer, "{text}");
        assert_eq!(serialize(&back), text);
    }

    #[test]
    fn test_round_trip_non_finite() {
        let exposure = Attribute::sampled(
            "inputs:exposure",
            ValueType::DOUBLE,
            [(TimeCode::from(1), Value::Double(f64::NEG_INFINITY)), (TimeCode::from(2), Value::Double(f64::NAN))],
        )
        .unwrap();
        let light = Prim::def("RectLight", "rect_light")
            .unwrap()
            .with_property(Attribute::constant("inputs:intensity", ValueType::FLOAT, Value::Float(f32::INFINITY)).unwrap())
            .with_property(exposure);
        let mut meta = MetaData::new();
        meta.set("metersPerUnit", MetaValue::Number(f64::INFINITY));
        let layer = Layer::new().with_metadata(meta).with_prim(light);

        let text = serialize(&layer);
        assert!(text.contains("float inputs:intensity = inf\n"));
        assert!(text.contains("1: -inf,\n"));
        assert!(text.contains("2: nan,\n"));

        let back = parse(&text).unwrap();
        let path = SdfPath::new("/rect_light").unwrap();
        assert_eq!(back.resolve(&path, "inputs:intensity", 1.0).unwrap(), &Value::Float(f32::INFINITY));
        assert_eq!(back.resolve(&path, "inputs:exposure", 1.0).unwrap(), &Value::Double(f64::NEG_INFINITY));
        assert!(matches!(back.resolve(&path, "inputs:exposure", 2.0).unwrap(), Value::Double(v) if v.is_nan()));
        assert_eq!(back.meters_per_unit(), Some(f64::INFINITY));
        assert_eq!(serialize(&back), text);
    }

    #[test]
    fn test_round_trip_specifiers_and_list_ops() {
        let base = Prim::new(Specifier::Class, None, "_base_light")
            .unwrap()
            .with_property(
                Relationship::new("light:filters", [SdfPath::new("/filters/barn").unwrap()])
                    .unwrap()
                    .with_op(Some(ListOp::Prepend)),
            );
        let over = Prim::new(Specifier::Over, Some("RectLight".into()), "rect_light")
            .unwrap()
            .with_property(
                Relationship::new("proxyPrim", [SdfPath::new("/a").unwrap(), SdfPath::new("/b.inputs:x").unwrap()])
                    .unwrap()
                    .with_op(Some(ListOp::Delete))
                    .with_custom(true),
            )
            .with_property(Relationship::declared("light:shadowLink").unwrap());
        let layer = Layer::new().with_prim(base).with_prim(over);

        let text = serialize(&layer);
        assert!(text.contains("class \"_base_light\"\n"));
        assert!(text.contains("over RectLight \"rect_light\"\n"));
        assert!(text.contains("delete custom rel proxyPrim = [</a>, </b.inputs:x>]\n"));
        assert_eq!(parse(&text).unwrap(), layer, "{text}");
    }

    #[test]
    fn test_attribute_lines() {
        let attr = Attribute::sampled("inputs:x", ValueType::DOUBLE, [(TimeCode::from(2), Value::Double(0.5))])
            .unwrap()
            .with_default(Value::Double(1.0))
            .unwrap()
            .with_custom(true)
            .with_connections(vec![SdfPath::new("/m/s.outputs:out").unwrap()]);
        let layer = Layer::new().with_prim(Prim::def("Shader", "s").unwrap().with_property(attr));
        let text = serialize(&layer);
        assert!(text.contains("custom double inputs:x = 1\n"));
        assert!(text.contains("custom double inputs:x.timeSamples = {\n"));
        assert!(text.contains("custom double inputs:x.connect = </m/s.outputs:out>\n"));
        assert_eq!(parse(&text).unwrap(), layer);
    }
}
