use crate::error::BuildError;
use crate::expr::EnumMemberRef;
use crate::ir::EnumType;

/// Resolve `Red`, `Red,Blue`, `"Red"`, `Org.Color/Red` or a member value
/// like `4` against the declared members of `enum_type`.
pub fn resolve_members(enum_type: &EnumType, text: &str) -> Result<Vec<EnumMemberRef>, BuildError> {
    let body = strip_quotes(text.trim());
    let tokens: Vec<&str> = body.split(',').map(str::trim).collect();

    if tokens.len() > 1 && !enum_type.is_flags {
        return Err(BuildError::NotFlags {
            enum_type: enum_type.name.clone(),
            raw: text.to_string(),
        });
    }

    let mut members = Vec::with_capacity(tokens.len());
    for token in tokens {
        let token = strip_quotes(token);
        let name = token
            .strip_prefix(enum_type.name.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(token);

        let found = enum_type
            .member_by_name(name)
            .or_else(|| name.parse::<i64>().ok().and_then(|v| enum_type.member_by_value(v)));
        let Some(member) = found else {
            return Err(BuildError::UnknownMember {
                enum_type: enum_type.name.clone(),
                member: name.to_string(),
            });
        };
        members.push(EnumMemberRef { name: member.name.clone(), value: member.value });
    }
    Ok(members)
}

fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}
