//! Recursive-descent parser producing a [`Layer`].

use super::lexer::{split_header, tokenize, Tok, Token};
use crate::core::{
    is_identifier, is_property_name, Attribute, DictValue, Dictionary, ListOp, MetaData, MetaEntry, MetaValue, SdfPath, TimeCode,
    TimeSamples, Variability,
};
use crate::layer::{Layer, Prim, Property, Relationship, Specifier};
use crate::util::{BaseType, Error, Result, Storage, Value, ValueType};
use glam::{DMat4, DVec2, DVec3, DVec4, Vec2, Vec3, Vec4};
use std::str::FromStr;
use tracing::{debug, trace};

/// Parse `.usda` text into a layer.
///
/// Fails with [`Error::Syntax`] on malformed text and [`Error::UnknownType`]
/// on an attribute type outside the recognized set. Sample sets are checked
/// as they are built, so [`Error::DuplicateTimeCode`] and
/// [`Error::EmptySampleSet`] surface here too.
pub fn parse(text: &str) -> Result<Layer> {
    let (version, body) = split_header(text)?;
    let tokens = tokenize(body, 2)?;
    let layer = Parser::new(tokens).layer(version)?;
    debug!(
        version = layer.version(),
        prims = layer.num_prims(),
        attributes = layer.num_attributes(),
        "parsed layer"
    );
    Ok(layer)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    // === Token access ===

    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|t| &t.tok)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Line of the current token, or of the last one at end of input.
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    fn error(&self, context: impl Into<String>) -> Error {
        Error::syntax(self.line(), context)
    }

    fn found(&self) -> String {
        self.peek().map_or_else(|| "end of file".to_string(), Tok::describe)
    }

    fn next(&mut self) -> Result<Token> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| self.error("unexpected end of file"))?;
        self.pos += 1;
        Ok(token)
    }

    fn is_punct(&self, c: char) -> bool {
        self.peek() == Some(&Tok::Punct(c))
    }

    fn eat_punct(&mut self, c: char) -> bool {
        let hit = self.is_punct(c);
        if hit {
            self.pos += 1;
        }
        hit
    }

    fn expect_punct(&mut self, c: char) -> Result<()> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{c}', found {}", self.found())))
        }
    }

    fn expect_ident(&mut self) -> Result<(String, usize)> {
        if let Some(Token { tok: Tok::Ident(word), line }) = self.tokens.get(self.pos) {
            let out = (word.clone(), *line);
            self.pos += 1;
            return Ok(out);
        }
        Err(self.error(format!("expected identifier, found {}", self.found())))
    }

    fn expect_str(&mut self) -> Result<String> {
        match self.peek() {
            Some(Tok::Str(s)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            _ => Err(self.error(format!("expected string, found {}", self.found()))),
        }
    }

    // === Structure ===

    fn layer(&mut self, version: &str) -> Result<Layer> {
        let mut layer = Layer::new().with_version(version);
        if self.eat_punct('(') {
            layer = layer.with_metadata(self.metadata_body()?);
        }
        while !self.at_end() {
            layer = layer.with_prim(self.prim()?);
        }
        Ok(layer)
    }

    fn prim(&mut self) -> Result<Prim> {
        let (word, line) = self.expect_ident()?;
        let specifier = Specifier::from_keyword(&word)
            .ok_or_else(|| Error::syntax(line, format!("expected 'def', 'over' or 'class', found '{word}'")))?;
        let type_name = match self.peek() {
            Some(Tok::Ident(_)) => Some(self.expect_ident()?.0),
            _ => None,
        };
        let name_line = self.line();
        let name = self.expect_str()?;
        if !is_identifier(&name) {
            return Err(Error::syntax(name_line, format!("invalid prim name \"{name}\"")));
        }

        if let Some(bad) = type_name.as_deref().filter(|t| !is_identifier(t)) {
            return Err(Error::syntax(line, format!("invalid type name '{bad}'")));
        }

        let mut prim = Prim::new(specifier, type_name, name)?;
        if self.eat_punct('(') {
            prim = prim.with_metadata(self.metadata_body()?);
        }
        self.expect_punct('{')?;
        loop {
            if self.eat_punct('}') {
                break;
            }
            match self.peek() {
                Some(Tok::Ident(word)) if Specifier::from_keyword(word).is_some() => {
                    let child = self.prim()?;
                    prim = prim.with_child(child);
                }
                Some(_) => self.property(&mut prim)?,
                None => return Err(self.error(format!("unclosed prim \"{}\"", prim.name()))),
            }
        }
        trace!(name = prim.name(), properties = prim.properties().len(), "parsed prim");
        Ok(prim)
    }

    fn property(&mut self, prim: &mut Prim) -> Result<()> {
        let (mut word, mut line) = self.expect_ident()?;
        let op = ListOp::from_keyword(&word);
        if op.is_some() {
            (word, line) = self.expect_ident()?;
        }
        let custom = word == "custom";
        if custom {
            (word, line) = self.expect_ident()?;
        }
        let variability = match word.as_str() {
            "uniform" => Variability::Uniform,
            _ => Variability::Varying,
        };
        if matches!(word.as_str(), "uniform" | "varying") {
            (word, line) = self.expect_ident()?;
        }

        if word == "rel" {
            return self.relationship(prim, op, custom);
        }
        if let Some(op) = op {
            return Err(Error::syntax(line, format!("'{}' is only valid on relationships", op.as_str())));
        }

        let ty = self.value_type(&word, line)?;
        let (full_name, name_line) = self.expect_ident()?;
        let (name, suffix) = match full_name.split_once('.') {
            Some((name, suffix)) => (name, Some(suffix)),
            None => (full_name.as_str(), None),
        };
        check_property_name(name, name_line)?;

        let mut attr = match prim.property(name) {
            Some(Property::Attribute(existing)) if existing.value_type() == ty => existing.clone(),
            Some(Property::Attribute(existing)) => {
                return Err(Error::syntax(
                    name_line,
                    format!("'{name}' redeclared as {ty}, was {}", existing.value_type()),
                ))
            }
            Some(Property::Relationship(_)) => {
                return Err(Error::syntax(name_line, format!("'{name}' is already a relationship")))
            }
            None => Attribute::declared(name, ty)?,
        };
        let was_custom = attr.is_custom();
        attr = attr.with_custom(was_custom || custom);
        if variability == Variability::Uniform {
            attr = attr.with_variability(variability);
        }

        match suffix {
            None => {
                if self.eat_punct('=') {
                    let value = self.typed_value(ty)?;
                    attr = attr.with_default(value)?;
                }
            }
            Some("timeSamples") => {
                self.expect_punct('=')?;
                self.expect_punct('{')?;
                attr = attr.with_samples(self.time_samples(ty)?)?;
            }
            Some("connect") => {
                self.expect_punct('=')?;
                attr = attr.with_connections(self.targets()?);
            }
            Some(other) => {
                return Err(Error::syntax(name_line, format!("unsupported property suffix '.{other}'")));
            }
        }
        if self.eat_punct('(') {
            attr = attr.with_metadata(self.metadata_body()?);
        }
        prim.set_property(attr.into());
        Ok(())
    }

    fn relationship(&mut self, prim: &mut Prim, op: Option<ListOp>, custom: bool) -> Result<()> {
        let (name, line) = self.expect_ident()?;
        check_property_name(&name, line)?;
        if prim.property(&name).is_some() {
            return Err(Error::syntax(line, format!("'{name}' declared twice")));
        }
        let mut rel = Relationship::declared(name)?.with_custom(custom).with_op(op);
        if self.eat_punct('=') {
            rel = rel.with_targets(self.targets()?);
        }
        if self.eat_punct('(') {
            rel = rel.with_metadata(self.metadata_body()?);
        }
        prim.set_property(rel.into());
        Ok(())
    }

    /// `</a>`, `[</a>, </b>]` or `None`.
    fn targets(&mut self) -> Result<Vec<SdfPath>> {
        let token = self.next()?;
        match token.tok {
            Tok::Path(p) => Ok(vec![SdfPath::from_raw(p)]),
            Tok::Ident(word) if word == "None" => Ok(Vec::new()),
            Tok::Punct('[') => {
                let mut paths = Vec::new();
                loop {
                    if self.eat_punct(']') {
                        break;
                    }
                    match self.next()?.tok {
                        Tok::Path(p) => paths.push(SdfPath::from_raw(p)),
                        other => return Err(self.error(format!("expected path, found {}", other.describe()))),
                    }
                    if !self.eat_punct(',') {
                        self.expect_punct(']')?;
                        break;
                    }
                }
                Ok(paths)
            }
            other => Err(Error::syntax(token.line, format!("expected target path, found {}", other.describe()))),
        }
    }

    // === Types and typed values ===

    /// Type token, with an optional `[]` suffix.
    fn value_type(&mut self, word: &str, line: usize) -> Result<ValueType> {
        let array = self.is_punct('[') && self.tokens.get(self.pos + 1).map(|t| &t.tok) == Some(&Tok::Punct(']'));
        if array {
            self.pos += 2;
        }
        BaseType::from_name(word)
            .map(|base| ValueType { base, array })
            .ok_or_else(|| Error::UnknownType {
                line,
                type_name: if array { format!("{word}[]") } else { word.to_string() },
            })
    }

    fn typed_value(&mut self, ty: ValueType) -> Result<Value> {
        if !ty.array {
            return self.scalar(ty);
        }
        self.expect_punct('[')?;
        let mut items = Vec::new();
        loop {
            if self.eat_punct(']') {
                break;
            }
            items.push(self.scalar(ty)?);
            if !self.eat_punct(',') {
                self.expect_punct(']')?;
                break;
            }
        }
        Ok(Value::Array(items))
    }

    fn scalar(&mut self, ty: ValueType) -> Result<Value> {
        let value = match ty.storage() {
            Storage::Bool => Value::Bool(self.bool_literal(ty)?),
            Storage::Int => Value::Int(self.number(ty)?),
            Storage::UInt => Value::UInt(self.number(ty)?),
            Storage::Int64 => Value::Int64(self.number(ty)?),
            Storage::Float => Value::Float(self.number(ty)?),
            Storage::Double => Value::Double(self.number(ty)?),
            Storage::Float2 => Value::Float2(Vec2::from_array(self.tuple(ty)?)),
            Storage::Float3 => Value::Float3(Vec3::from_array(self.tuple(ty)?)),
            Storage::Float4 => Value::Float4(Vec4::from_array(self.tuple(ty)?)),
            Storage::Double2 => Value::Double2(DVec2::from_array(self.tuple(ty)?)),
            Storage::Double3 => Value::Double3(DVec3::from_array(self.tuple(ty)?)),
            Storage::Double4 => Value::Double4(DVec4::from_array(self.tuple(ty)?)),
            Storage::Matrix4d => {
                self.expect_punct('(')?;
                let mut rows = [[0.0; 4]; 4];
                for (i, row) in rows.iter_mut().enumerate() {
                    if i > 0 {
                        self.expect_punct(',')?;
                    }
                    *row = self.tuple(ty)?;
                }
                self.expect_punct(')')?;
                Value::Matrix4d(DMat4::from_cols_array_2d(&rows))
            }
            Storage::Token => Value::Token(self.text(ty)?),
            Storage::String => Value::String(self.text(ty)?),
            Storage::Asset => match self.peek() {
                Some(Tok::Asset(path)) => {
                    let path = path.clone();
                    self.pos += 1;
                    Value::Asset(path)
                }
                _ => return Err(self.expected(ty)),
            },
        };
        Ok(value)
    }

    fn expected(&self, ty: ValueType) -> Error {
        self.error(format!("expected {ty} value, found {}", self.found()))
    }

    fn bool_literal(&mut self, ty: ValueType) -> Result<bool> {
        let value = match self.peek() {
            Some(Tok::Ident(w)) if w == "true" => true,
            Some(Tok::Ident(w)) if w == "false" => false,
            Some(Tok::Number(n)) if n == "1" => true,
            Some(Tok::Number(n)) if n == "0" => false,
            _ => return Err(self.expected(ty)),
        };
        self.pos += 1;
        Ok(value)
    }

    fn number<T: FromStr>(&mut self, ty: ValueType) -> Result<T> {
        let parsed = self.peek().and_then(numeric_text).and_then(|text| text.parse::<T>().ok());
        let value = parsed.ok_or_else(|| self.expected(ty))?;
        self.pos += 1;
        Ok(value)
    }

    fn tuple<T: FromStr + Copy + Default, const N: usize>(&mut self, ty: ValueType) -> Result<[T; N]> {
        self.expect_punct('(')?;
        let mut out = [T::default(); N];
        for (i, slot) in out.iter_mut().enumerate() {
            if i > 0 {
                self.expect_punct(',')?;
            }
            *slot = self.number(ty)?;
        }
        self.expect_punct(')')?;
        Ok(out)
    }

    fn text(&mut self, ty: ValueType) -> Result<String> {
        match self.peek() {
            Some(Tok::Str(_)) => self.expect_str(),
            _ => Err(self.expected(ty)),
        }
    }

    /// Body of `name.timeSamples = { ... }`, after the opening brace.
    fn time_samples(&mut self, ty: ValueType) -> Result<TimeSamples> {
        let mut samples = Vec::new();
        loop {
            if self.eat_punct('}') {
                break;
            }
            let line = self.line();
            let time: f64 = match self.peek() {
                Some(Tok::Number(text)) => text.parse().ok(),
                _ => None,
            }
            .ok_or_else(|| self.error(format!("expected time code, found {}", self.found())))?;
            self.pos += 1;
            let time = TimeCode::new(time).map_err(|_| Error::syntax(line, format!("invalid time code {time}")))?;
            self.expect_punct(':')?;
            samples.push((time, self.typed_value(ty)?));
            if !self.eat_punct(',') {
                self.expect_punct('}')?;
                break;
            }
        }
        TimeSamples::new(ty, samples)
    }

    // === Metadata ===

    /// Entries of a `( ... )` block, after the opening parenthesis.
    fn metadata_body(&mut self) -> Result<MetaData> {
        let mut meta = MetaData::new();
        loop {
            if self.eat_punct(')') {
                break;
            }
            if self.eat_punct(';') {
                continue;
            }
            match self.peek() {
                Some(Tok::Str(_)) => {
                    let doc = self.expect_str()?;
                    meta.set(MetaData::DOC_KEY, MetaValue::String(doc));
                }
                Some(Tok::Ident(_)) => {
                    let (word, _) = self.expect_ident()?;
                    let op = ListOp::from_keyword(&word).filter(|_| !self.is_punct('='));
                    let key = match op {
                        Some(_) => self.expect_ident()?.0,
                        None => word,
                    };
                    self.expect_punct('=')?;
                    let value = self.meta_value()?;
                    match op {
                        Some(op) => meta.push(MetaEntry { op: Some(op), key, value }),
                        None => meta.set(key, value),
                    }
                }
                _ => return Err(self.error(format!("expected metadata entry, found {}", self.found()))),
            }
        }
        Ok(meta)
    }

    fn meta_value(&mut self) -> Result<MetaValue> {
        let token = self.next()?;
        let value = match token.tok {
            Tok::Number(text) => MetaValue::Number(
                text.parse()
                    .map_err(|_| Error::syntax(token.line, format!("invalid number '{text}'")))?,
            ),
            Tok::Str(s) => MetaValue::String(s),
            Tok::Ident(word) if is_non_finite(&word) => MetaValue::Number(
                word.parse()
                    .map_err(|_| Error::syntax(token.line, format!("invalid number '{word}'")))?,
            ),
            Tok::Ident(word) => MetaValue::Ident(word),
            Tok::Asset(asset) => match self.peek() {
                Some(Tok::Path(prim)) => {
                    let prim = SdfPath::from_raw(prim.as_str());
                    self.pos += 1;
                    MetaValue::Reference { asset, prim }
                }
                _ => MetaValue::Asset(asset),
            },
            Tok::Path(p) => MetaValue::Path(SdfPath::from_raw(p)),
            Tok::Punct('[') => MetaValue::List(self.meta_seq(']')?),
            Tok::Punct('(') => MetaValue::Tuple(self.meta_seq(')')?),
            Tok::Punct('{') => MetaValue::Dictionary(self.dictionary_body()?),
            other => {
                return Err(Error::syntax(token.line, format!("expected metadata value, found {}", other.describe())))
            }
        };
        Ok(value)
    }

    fn meta_seq(&mut self, close: char) -> Result<Vec<MetaValue>> {
        let mut items = Vec::new();
        loop {
            if self.eat_punct(close) {
                break;
            }
            items.push(self.meta_value()?);
            if !self.eat_punct(',') {
                self.expect_punct(close)?;
                break;
            }
        }
        Ok(items)
    }

    /// Entries of a `{ ... }` dictionary, after the opening brace.
    fn dictionary_body(&mut self) -> Result<Dictionary> {
        let mut dict = Dictionary::new();
        loop {
            if self.eat_punct('}') {
                break;
            }
            if self.eat_punct(';') || self.eat_punct(',') {
                continue;
            }
            let (type_name, line) = self.expect_ident()?;
            if type_name == "dictionary" {
                let key = self.dict_key()?;
                self.expect_punct('=')?;
                self.expect_punct('{')?;
                let nested = self.dictionary_body()?;
                dict.insert(key, DictValue::Dictionary(nested));
            } else {
                let ty = self.value_type(&type_name, line)?;
                let key = self.dict_key()?;
                self.expect_punct('=')?;
                let value = self.typed_value(ty)?;
                dict.insert(key, DictValue::Typed { ty, value });
            }
        }
        Ok(dict)
    }

    fn dict_key(&mut self) -> Result<String> {
        match self.peek() {
            Some(Tok::Ident(_)) => Ok(self.expect_ident()?.0),
            Some(Tok::Str(_)) => self.expect_str(),
            _ => Err(self.error(format!("expected dictionary key, found {}", self.found()))),
        }
    }
}

fn check_property_name(name: &str, line: usize) -> Result<()> {
    if is_property_name(name) {
        Ok(())
    } else {
        Err(Error::syntax(line, format!("invalid property name '{name}'")))
    }
}

/// Text of a numeric token. Unsigned `inf` and `nan` lex as identifiers.
fn numeric_text(tok: &Tok) -> Option<&str> {
    match tok {
        Tok::Number(text) => Some(text.as_str()),
        Tok::Ident(word) if is_non_finite(word) => Some(word.as_str()),
        _ => None,
    }
}

fn is_non_finite(word: &str) -> bool {
    matches!(word, "inf" | "nan")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT_LIGHT: &str = r#"#usda 1.0
(
    "Rect light test scene"
    defaultPrim = "lights"
    endTimeCode = 31
    framesPerSecond = 24
    metersPerUnit = 1
    startTimeCode = 1
    upAxis = "Y"
    customLayerData = {
        dictionary MovieCaptureSettings = {
            int capture_frame_end = 31
            string "capture name" = "rect"
        }
    }
)

def Scope "lights"
{
    def RectLight "rect_light" (
        prepend apiSchemas = ["ShapingAPI"]
        kind = "component"
    )
    {
        float inputs:intensity.timeSamples = {
            1: 1,
            11: 1000,
        }
        float inputs:exposure = 0
        color3f inputs:color = (1, 0.5, 0.25)
        uniform bool inputs:normalize = 1
        asset inputs:shaping:ies:file = @./ies/test.ies@
        matrix4d xformOp:transform = ( (1, 0, 0, 0), (0, 1, 0, 0), (0, 0, 1, 0), (0, 5, 0, 1) )
        uniform token[] xformOpOrder = ["xformOp:transform"]
        custom int houdini:id = 7 (
            doc = "authoring id"
        )
        rel light:filters = None
        rel proxyPrim
    }
}
"#;

    fn light(layer: &Layer) -> &Prim {
        layer.prim_at(&SdfPath::new("/lights/rect_light").unwrap()).unwrap()
    }

    #[test]
    fn test_parse_layer_metadata() {
        let layer = parse(RECT_LIGHT).unwrap();
        assert_eq!(layer.version(), "1.0");
        assert_eq!(layer.metadata().doc(), Some("Rect light test scene"));
        assert_eq!(layer.start_time_code(), Some(1.0));
        assert_eq!(layer.end_time_code(), Some(31.0));
        assert_eq!(layer.frames_per_second(), Some(24.0));
        assert_eq!(layer.up_axis(), Some("Y"));
        assert_eq!(layer.default_prim(), Some("lights"));
        let data = layer.custom_layer_data().unwrap();
        assert_eq!(data.value_at(&["MovieCaptureSettings", "capture_frame_end"]), Some(&Value::Int(31)));
        assert_eq!(
            data.value_at(&["MovieCaptureSettings", "capture name"]),
            Some(&Value::String("rect".into()))
        );
    }

    #[test]
    fn test_parse_attributes() {
        let layer = parse(RECT_LIGHT).unwrap();
        let prim = light(&layer);
        assert_eq!(prim.type_name(), Some("RectLight"));
        assert!(prim.metadata().contains("apiSchemas"));
        assert_eq!(prim.metadata().kind(), Some("component"));

        let intensity = prim.attribute("inputs:intensity").unwrap();
        assert_eq!(intensity.sample_times(), vec![TimeCode::from(1), TimeCode::from(11)]);
        assert_eq!(intensity.get(10.0).unwrap(), &Value::Float(1.0));

        let color = prim.attribute("inputs:color").unwrap();
        assert_eq!(color.default_value(), Some(&Value::Float3(Vec3::new(1.0, 0.5, 0.25))));

        let normalize = prim.attribute("inputs:normalize").unwrap();
        assert_eq!(normalize.variability(), Variability::Uniform);
        assert_eq!(normalize.default_value(), Some(&Value::Bool(true)));

        let ies = prim.attribute("inputs:shaping:ies:file").unwrap();
        assert_eq!(ies.default_value(), Some(&Value::Asset("./ies/test.ies".into())));

        let xform = prim.attribute("xformOp:transform").unwrap();
        match xform.default_value() {
            Some(Value::Matrix4d(m)) => assert_eq!(m.w_axis, DVec4::new(0.0, 5.0, 0.0, 1.0)),
            other => panic!("unexpected value: {other:?}"),
        }

        let id = prim.attribute("houdini:id").unwrap();
        assert!(id.is_custom());
        assert_eq!(id.metadata().doc(), Some("authoring id"));

        assert_eq!(prim.relationship("light:filters").unwrap().targets(), Some(&[][..]));
        assert_eq!(prim.relationship("proxyPrim").unwrap().targets(), None);
    }

    #[test]
    fn test_merge_default_samples_and_connect() {
        let text = r#"#usda 1.0
def Material "mat"
{
    float inputs:x = 2
    float inputs:x.timeSamples = {
        3: 4,
    }
    float inputs:x.connect = </mat/shader.outputs:out>
    custom int houdini:id = 1
    int houdini:id.timeSamples = {
        1: 2,
    }
}
"#;
        let layer = parse(text).unwrap();
        let attr = layer.prims()[0].attribute("inputs:x").unwrap();
        assert_eq!(attr.default_value(), Some(&Value::Float(2.0)));
        assert_eq!(attr.num_samples(), 1);
        assert_eq!(attr.connections().len(), 1);
        assert_eq!(attr.get(0.0).unwrap(), &Value::Float(4.0));

        // `custom` on any line marks the merged attribute
        let id = layer.prims()[0].attribute("houdini:id").unwrap();
        assert!(id.is_custom());
        assert_eq!(id.num_samples(), 1);
    }

    #[test]
    fn test_unknown_type() {
        let text = "#usda 1.0\ndef Xform \"a\"\n{\n    half inputs:h = 1\n}\n";
        match parse(text).unwrap_err() {
            Error::UnknownType { line, type_name } => {
                assert_eq!(line, 4);
                assert_eq!(type_name, "half");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let text = "#usda 1.0\ndef Xform \"a\"\n{\n    quatf[] q = []\n}\n";
        assert!(matches!(parse(text), Err(Error::UnknownType { type_name, .. }) if type_name == "quatf[]"));
    }

    #[test]
    fn test_syntax_errors() {
        let cases = [
            ("#usda 1.0\ndef Xform \"a\"\n{\n    float x = \"hello\"\n}\n", 4),
            ("#usda 1.0\ndef Xform \"a\"\n{\n", 3),
            ("#usda 1.0\nrel x = None\n", 2),
            ("#usda 1.0\ndef Xform \"a\" {\n    float x.timeSamples = { 1: 2 3: 4 }\n}\n", 3),
            ("#usda 1.0\n\ndef Rect:Light \"a\"\n{\n}\n", 3),
        ];
        for (text, expected_line) in cases {
            match parse(text) {
                Err(Error::Syntax { line, .. }) => assert_eq!(line, expected_line, "{text}"),
                other => panic!("expected syntax error for {text:?}, got {other:?}"),
            }
        }
        assert!(matches!(parse("usda 1.0\n"), Err(Error::Syntax { line: 1, .. })));
    }

    #[test]
    fn test_non_finite_literals() {
        let text = "#usda 1.0\n(\n    metersPerUnit = nan\n)\n\ndef Scope \"s\"\n{\n    float3 inputs:a = (inf, -inf, 1)\n    double inputs:b = nan\n}\n";
        let layer = parse(text).unwrap();
        let s = SdfPath::new("/s").unwrap();
        assert_eq!(
            layer.resolve(&s, "inputs:a", 0.0).unwrap(),
            &Value::Float3(Vec3::new(f32::INFINITY, f32::NEG_INFINITY, 1.0))
        );
        assert!(matches!(layer.resolve(&s, "inputs:b", 0.0).unwrap(), Value::Double(v) if v.is_nan()));
        assert!(layer.meters_per_unit().is_some_and(f64::is_nan));

        // integers have no non-finite spelling
        let err = parse("#usda 1.0\n\ndef Scope \"s\"\n{\n    int inputs:c = inf\n}\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 5, .. }));
    }

    #[test]
    fn test_sample_set_errors() {
        let dup = "#usda 1.0\ndef Xform \"a\" {\n    string s.timeSamples = { 5: \"a\", 5: \"b\" }\n}\n";
        assert!(matches!(parse(dup), Err(Error::DuplicateTimeCode(t)) if t == 5.0));
        let empty = "#usda 1.0\ndef Xform \"a\" {\n    double d.timeSamples = { }\n}\n";
        assert!(matches!(parse(empty), Err(Error::EmptySampleSet)));
    }
}
