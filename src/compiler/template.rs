//! 替换模板规范化
//! 将用户书写的替换模板（`$1`、`\$`、`${name}`）转换为正则引擎 expand 所用的语法
//! 数字引用一律改写为 `${N}` 形式，避免 `$1abc` 被当作命名分组

/// 替换模板工具类
pub struct ReplacementTemplate;

impl ReplacementTemplate {
    /// 规范化替换模板
    ///
    /// # 参数
    /// - `template`: 用户书写的替换模板
    /// - `group_count`: 正则的捕获分组数（不含整体匹配）
    ///
    /// # 规则
    /// 1. `$N` 贪婪读取数字，但分组号不得超过 `group_count`（首位数字总是读取）
    /// 2. `${name}` 原样保留
    /// 3. `\x` 输出字面量 `x`
    /// 4. 其余 `$` 视为字面量
    pub fn normalize(template: &str, group_count: usize) -> String {
        let mut out = String::with_capacity(template.len() + 8);
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('$') => out.push_str("$$"),
                    Some(escaped) => out.push(escaped),
                    // 末尾孤立的反斜杠按字面量处理
                    None => out.push('\\'),
                },
                '$' => match chars.peek().copied() {
                    Some(d) if d.is_ascii_digit() => {
                        chars.next();
                        let mut group = d.to_digit(10).unwrap_or(0) as usize;
                        while let Some(next) = chars.peek().and_then(|n| n.to_digit(10)) {
                            let candidate = group * 10 + next as usize;
                            if candidate > group_count {
                                break;
                            }
                            group = candidate;
                            chars.next();
                        }
                        out.push_str(&format!("${{{}}}", group));
                    }
                    Some('{') => {
                        // 命名分组引用：读到 `}` 为止；未闭合则按字面量输出
                        let mut name = String::new();
                        let mut closed = false;
                        chars.next();
                        for n in chars.by_ref() {
                            if n == '}' {
                                closed = true;
                                break;
                            }
                            name.push(n);
                        }
                        if closed && !name.is_empty() {
                            out.push_str("${");
                            out.push_str(&name);
                            out.push('}');
                        } else {
                            out.push_str("$${");
                            out.push_str(&name);
                            if closed {
                                out.push('}');
                            }
                        }
                    }
                    _ => out.push_str("$$"),
                },
                other => out.push(other),
            }
        }

        out
    }
}
