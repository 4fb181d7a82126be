use crate::{
    tokenizer::Token,
    types::{Definition, Field, Model},
    utils::{error, quote},
    error::CclError,
};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER:      Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref EQUALS:          Regex = Regex::new(r"^=$").unwrap();
    static ref SEMICOLON:       Regex = Regex::new(r"^;$").unwrap();
    static ref INTEGER:         Regex = Regex::new(r"^[0-9]+$").unwrap();
    static ref LEFT_BRACE:      Regex = Regex::new(r"^\{$").unwrap();
    static ref RIGHT_BRACE:     Regex = Regex::new(r"^\}$").unwrap();
    static ref ARRAY_TOKEN:     Regex = Regex::new(r"^\[\]$").unwrap();
    static ref MODEL_KEYWORD:   Regex = Regex::new(r"^model$").unwrap();
    static ref PACKAGE_KEYWORD: Regex = Regex::new(r"^package$").unwrap();
    static ref EOF:             Regex = Regex::new(r"^$").unwrap();
}

/// Builds a [Definition] from tokens produced by
/// [tokenize_schema](crate::tokenizer::tokenize_schema).
///
/// Models without an explicit `= N` take their declaration index as id.
/// Names are not checked here; see [verify_definition](crate::verifier::verify_definition).
pub fn parse_schema(tokens: &[Token]) -> Result<Definition, CclError> {
    let mut models       = Vec::new();
    let mut package_text = None;
    let mut index        = 0;

    if tokens.is_empty() {
        return Ok(Definition { package: None, models });
    }

    // Reads past the end repeat the final token, normally the end marker.
    fn current_token(tokens: &[Token], index: usize) -> &Token {
        tokens.get(index).unwrap_or(&tokens[tokens.len() - 1])
    }

    fn eat(tokens: &[Token], index: &mut usize, test: &Regex) -> bool {
        if test.is_match(&current_token(tokens, *index).text) {
            *index += 1;
            true
        } else {
            false
        }
    }

    fn expect(tokens: &[Token], index: &mut usize, test: &Regex, expected: &str) -> Result<(), CclError> {
        if !eat(tokens, index, test) {
            let tok = current_token(tokens, *index);
            return Err(error(
                &format!("Expected {} but found {}", expected, quote(&tok.text)),
                tok.line,
                tok.column,
            ));
        }
        Ok(())
    }

    if eat(tokens, &mut index, &PACKAGE_KEYWORD) {
        let pkg_tok = current_token(tokens, index);
        expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
        package_text = Some(pkg_tok.text.clone());
        expect(tokens, &mut index, &SEMICOLON, "\";\"")?;
    }

    while index < tokens.len() && !eat(tokens, &mut index, &EOF) {
        if !eat(tokens, &mut index, &MODEL_KEYWORD) {
            let tok = current_token(tokens, index);
            return Err(error(
                &format!("Unexpected token {}", quote(&tok.text)),
                tok.line,
                tok.column,
            ));
        }

        let name_tok = current_token(tokens, index);
        expect(tokens, &mut index, &IDENTIFIER, "identifier")?;

        let model_id = if eat(tokens, &mut index, &EQUALS) {
            let id_tok = current_token(tokens, index);
            expect(tokens, &mut index, &INTEGER, "integer")?;
            id_tok.text.parse::<u32>().map_err(|_| {
                error(
                    &format!("Invalid model id {}", quote(&id_tok.text)),
                    id_tok.line,
                    id_tok.column,
                )
            })?
        } else {
            models.len() as u32
        };

        expect(tokens, &mut index, &LEFT_BRACE, "\"{\"")?;

        let mut fields = Vec::new();
        while !eat(tokens, &mut index, &RIGHT_BRACE) {
            let f_tok = current_token(tokens, index);
            expect(tokens, &mut index, &IDENTIFIER, "identifier")?;

            let is_array = eat(tokens, &mut index, &ARRAY_TOKEN);

            let t_tok = current_token(tokens, index);
            expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
            expect(tokens, &mut index, &SEMICOLON, "\";\"")?;

            fields.push(Field {
                name:   f_tok.text.clone(),
                line:   f_tok.line,
                column: f_tok.column,
                type_:  t_tok.text.clone(),
                is_array,
            });
        }

        models.push(Model {
            name:   name_tok.text.clone(),
            line:   name_tok.line,
            column: name_tok.column,
            model_id,
            fields,
        });
    }

    Ok(Definition {
        package: package_text,
        models,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize_schema;

    fn parse(text: &str) -> Result<Definition, CclError> {
        parse_schema(&tokenize_schema(text).unwrap())
    }

    #[test]
    fn test_parse_package_and_models() {
        let def = parse("package shapes;\nmodel Point { X int32; Y int32; }\nmodel Line { Points []Point; }").unwrap();
        assert_eq!(def.package.as_deref(), Some("shapes"));
        assert_eq!(def.models.len(), 2);
        assert_eq!(def.models[0].name, "Point");
        assert_eq!(def.models[0].model_id, 0);
        assert_eq!(def.models[1].model_id, 1);
        assert_eq!(def.models[1].fields[0].name, "Points");
        assert_eq!(def.models[1].fields[0].type_, "Point");
        assert!(def.models[1].fields[0].is_array);
        assert_eq!((def.models[1].line, def.models[1].column), (3, 7));
    }

    #[test]
    fn test_parse_explicit_model_id() {
        let def = parse("model A = 7 {}\nmodel B {}").unwrap();
        assert_eq!(def.models[0].model_id, 7);
        assert_eq!(def.models[1].model_id, 1);
        assert!(def.package.is_none());
    }

    #[test]
    fn test_parse_empty_input() {
        let def = parse("// nothing here\n").unwrap();
        assert!(def.models.is_empty());
    }

    #[test]
    fn test_parse_model_id_out_of_range() {
        let err = parse("model A = 4294967296 {}").unwrap_err();
        match err {
            CclError::ParseError { msg, line, column } => {
                assert_eq!(msg, "Invalid model id \"4294967296\"");
                assert_eq!((line, column), (1, 11));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_parse_missing_semicolon() {
        let err = parse("model A { X int32 }").unwrap_err();
        match err {
            CclError::ParseError { msg, line, column } => {
                assert_eq!(msg, "Expected \";\" but found \"}\"");
                assert_eq!((line, column), (1, 19));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_parse_unterminated_model() {
        assert!(parse("model A { X int32;").is_err());
    }

    #[test]
    fn test_parse_unexpected_keyword() {
        let err = parse("struct A {}").unwrap_err();
        assert!(err.to_string().contains("Unexpected token \"struct\""), "{}", err);
    }
}
